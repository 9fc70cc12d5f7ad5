//! Command-line arguments.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Terminal admin console for personas físicas.
#[derive(Debug, Parser)]
#[command(name = "personas-tui", version)]
pub struct Args {
    /// Path to the JSONC config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// API base URL, overriding the config file
    #[arg(long)]
    pub base_url: Option<String>,

    /// Rows per page, overriding the config file
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.api_base_url = base_url.clone();
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size.max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let args = Args::parse_from(["personas-tui", "--base-url", "http://api.local", "--page-size", "0"]);
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.api_base_url, "http://api.local");
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let args = Args::parse_from(["personas-tui", "-c", "/tmp/x.jsonc"]);
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.page_size, 20);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/x.jsonc")));
    }
}
