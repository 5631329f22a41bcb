use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;

use crate::{
    cli::handlers::commons,
    core::{lexer::ParseError, registry::TemplateIssue},
    system::snapshot::ActionTable,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Reports parse errors, unresolved submenus and shortcut problems."
)]
struct CheckArgs {
    /// The UI definition file or fragment directory.
    #[arg(long, short)]
    file: Option<String>,
}

/// Reads the definitions bypassing the cache, so every diagnostic is seen, and
/// fails when any problem was found.
pub fn handle(args: Vec<String>) -> Result<()> {
    let check_args = CheckArgs::try_parse_from(&args)?;
    let actions = ActionTable::default();

    let loaded = commons::load_templates(check_args.file, true, &actions)?;
    let root = loaded
        .sources
        .first()
        .map(|s| s.path.display().to_string())
        .unwrap_or_default();
    println!("\n{}", format!(t!("check.header"), path = root).bold());

    let issues = loaded.registry.check();
    let problems = report_lines(&loaded.diagnostics, &issues);
    // Diagnostics were already printed while loading.
    for line in problems.iter().skip(loaded.diagnostics.len()) {
        println!("  {} {}", "-".yellow(), line);
    }

    if problems.is_empty() {
        println!("  {}", t!("check.ok").green());
        Ok(())
    } else {
        Err(anyhow!(t!("check.summary"), count = problems.len()))
    }
}

/// Parse diagnostics first, then template issues.
fn report_lines(diagnostics: &[ParseError], issues: &[TemplateIssue]) -> Vec<String> {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .chain(issues.iter().map(ToString::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::MenuRegistry;

    #[test]
    fn test_report_lines_order() {
        let (registry, diagnostics) = MenuRegistry::parse(
            "test.ui",
            r#"menuset bogus menu "file" submenu "Recent|R" "recent" end end"#,
            &ActionTable::default(),
        );
        let issues = registry.check();
        let lines = report_lines(&diagnostics, &issues);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("bogus"));
        assert!(lines[1].contains("recent"));
    }
}
