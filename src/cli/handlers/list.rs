use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::{
    cli::handlers::commons,
    core::{menu::Menu, registry::MenuRegistry},
    system::snapshot::ActionTable,
};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists the menus a UI definition declares.")]
struct ListArgs {
    /// The UI definition file or fragment directory.
    #[arg(long, short)]
    file: Option<String>,

    /// Re-read the UI definitions instead of using the template cache.
    #[arg(long)]
    no_cache: bool,
}

/// Lists the registered menus with their entry counts.
pub fn handle(args: Vec<String>) -> Result<()> {
    let list_args = ListArgs::try_parse_from(&args)?;
    let loaded = commons::load_templates(list_args.file, list_args.no_cache, &ActionTable::default())?;

    println!("\n{}", t!("list.header").bold());
    for (name, count) in menu_summary(&loaded.registry) {
        println!("  {:<24} {}", name.cyan(), count.to_string().dimmed());
    }
    Ok(())
}

/// Menu names with their template entry counts, menubar first.
fn menu_summary(registry: &MenuRegistry) -> Vec<(String, usize)> {
    std::iter::once((t!("list.menubar").to_string(), registry.menubar().len()))
        .chain(
            registry
                .menus()
                .iter()
                .map(|menu: &Menu| (menu.name().to_string(), menu.len())),
        )
        .collect()
}
