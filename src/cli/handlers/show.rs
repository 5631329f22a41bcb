use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::Colorize;
use std::path::Path;

use crate::{
    cli::handlers::commons,
    core::{
        menu::Menu,
        menu_display::{self, DisplayOptions},
        registry::{MenuRegistry, exclusion_menu},
    },
    system::snapshot::ContextSnapshot,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Expands a menu against a context and prints it."
)]
struct ShowArgs {
    /// The menu to expand. Defaults to the menubar.
    menu: Option<String>,

    /// The UI definition file or fragment directory.
    #[arg(long, short)]
    file: Option<String>,

    /// A TOML context snapshot to expand against. Defaults to an empty context.
    #[arg(long, short)]
    context: Option<String>,

    /// Print the expanded menu as JSON.
    #[arg(long)]
    json: bool,

    /// Re-read the UI definitions instead of using the template cache.
    #[arg(long)]
    no_cache: bool,

    /// Show the key binding of each command.
    #[arg(long, short)]
    bindings: bool,

    /// Show the action request of each command.
    #[arg(long)]
    commands: bool,

    /// Limit the depth of the tree display.
    #[arg(long, short)]
    depth: Option<usize>,
}

/// Expands a menu against a context snapshot and prints it as a tree or JSON.
pub fn handle(args: Vec<String>) -> Result<()> {
    let show_args = ShowArgs::try_parse_from(&args)?;

    let snapshot = match &show_args.context {
        Some(path) => ContextSnapshot::load(Path::new(path))?,
        None => ContextSnapshot::default(),
    };

    let loaded = commons::load_templates(show_args.file, show_args.no_cache, &snapshot.actions)?;
    let mut registry = loaded.registry;
    registry.special_menu(exclusion_menu(
        snapshot.exclude.iter().map(String::as_str),
        &snapshot.actions,
    ));

    let (template, header) = select_menu(&registry, show_args.menu.as_deref())?;
    let expanded = registry.expand(template, &snapshot.context());

    if show_args.json {
        let view = menu_display::menu_view(&expanded, &snapshot);
        let json = serde_json::to_string_pretty(&view)
            .context("Failed to serialize the expanded menu.")?;
        println!("{}", json);
        return Ok(());
    }

    println!("\n{}", header.bold());
    if expanded.is_empty() {
        println!("  {}", t!("show.info.empty").dimmed());
        return Ok(());
    }
    let options = DisplayOptions {
        show_bindings: show_args.bindings,
        show_commands: show_args.commands,
        max_depth: show_args.depth,
        plain: false,
    };
    menu_display::display_menu_tree(&expanded, &snapshot, &options);
    Ok(())
}

/// The template to expand and the header shown above it.
fn select_menu<'a>(registry: &'a MenuRegistry, name: Option<&str>) -> Result<(&'a Menu, String)> {
    match name {
        None => Ok((registry.menubar(), t!("show.header.menubar").to_string())),
        Some(name) => registry
            .get_menu(name)
            .map(|menu| (menu, format!(t!("show.header.menu"), name = name)))
            .ok_or_else(|| anyhow!(t!("show.error.menu_not_found"), name = name)),
    }
}
