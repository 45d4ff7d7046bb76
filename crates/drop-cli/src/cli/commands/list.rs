//! `drop --list-destinations`

use anyhow::Result;
use drop_core::config::DropConfig;
use drop_core::resolver::list_destinations;

/// One line per destination, the default marked with ` (default)`.
pub fn destination_lines(cfg: &DropConfig) -> Vec<String> {
    list_destinations(cfg)
        .into_iter()
        .map(|(name, is_default)| {
            if is_default {
                format!("{name} (default)")
            } else {
                name.to_string()
            }
        })
        .collect()
}

pub fn run_list(cfg: &DropConfig) -> Result<()> {
    for line in destination_lines(cfg) {
        println!("{line}");
    }
    Ok(())
}
