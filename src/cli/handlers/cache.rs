use anyhow::{Result, anyhow};
use colored::Colorize;

use crate::{
    cli::handlers::commons,
    core::{cache, paths},
    system::settings::Settings,
};

/// `menuset cache clear` removes every cached template set; `menuset cache
/// path` prints the cache directory.
pub fn handle(args: Vec<String>) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("clear") => {
            let settings = Settings::load()?;
            let configured = settings.cache_dir();
            let dir = paths::cache_dir(configured.as_deref())?;
            let removed = cache::clear_cache(&dir)?;
            println!(
                "{}",
                format!(
                    t!("cache.cleared"),
                    count = removed,
                    path = dir.display()
                )
                .green()
            );
            Ok(())
        }
        Some("path") => {
            let settings = Settings::load()?;
            match commons::load_options(&settings, false).cache_dir {
                Some(dir) => println!("{}", dir.display()),
                None => println!("{}", "-".dimmed()),
            }
            Ok(())
        }
        _ => Err(anyhow!(t!("cache.usage"))),
    }
}
