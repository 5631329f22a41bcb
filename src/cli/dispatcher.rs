use anyhow::{Result, anyhow};

use crate::cli::handlers;

/// A CLI command, its aliases and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>) -> Result<()>,
}

/// Every command the binary understands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "show",
        aliases: &["expand"],
        handler: handlers::show::handle,
    },
    CommandDefinition {
        name: "check",
        aliases: &[],
        handler: handlers::check::handle,
    },
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "cache",
        aliases: &[],
        handler: handlers::cache::handle,
    },
];

/// Finds a command definition by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Routes `menuset <command> [args...]` to its handler. Without a command the
/// menubar is shown.
pub fn dispatch(all_args: Vec<String>) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let mut args = all_args.into_iter();
    let Some(name) = args.next() else {
        return handlers::show::handle(Vec::new());
    };

    match find_command(&name) {
        Some(command) => (command.handler)(args.collect()),
        None => {
            let available: Vec<&str> = COMMAND_REGISTRY.iter().map(|c| c.name).collect();
            Err(anyhow!(
                t!("cli.error.unknown_command"),
                name = name,
                available = available.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_command_by_name_and_alias() {
        assert_eq!(find_command("show").map(|c| c.name), Some("show"));
        assert_eq!(find_command("ls").map(|c| c.name), Some("list"));
        assert!(find_command("frobnicate").is_none());
    }

    #[test]
    fn test_unknown_command_lists_available_ones() {
        let err = dispatch(vec!["frobnicate".to_string()]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("frobnicate"));
        assert!(message.contains("show, check, list, cache"));
    }
}
