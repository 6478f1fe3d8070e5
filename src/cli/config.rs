use std::path::Path;

use request_desk::{Config, storage::directory::CONFIG_FILE};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Print a single configuration value
    Get {
        /// Configuration key to read
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(CONFIG_FILE);
        let mut config = super::load_config(&config_path)?;

        match self.command {
            ConfigCommand::Show => show(&config),
            ConfigCommand::Get { key } => {
                let value = config.get(&key).ok_or_else(|| unknown_key(&key))?;
                println!("{value}");
            }
            ConfigCommand::Set { key, value } => {
                config.set(&key, &value).map_err(|e| {
                    if Config::KEYS.contains(&key.as_str()) {
                        anyhow::anyhow!("{e}")
                    } else {
                        unknown_key(&key)
                    }
                })?;
                config
                    .save(&config_path)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;

                let shown = config.get(&key).unwrap_or_default();
                println!("{}", format!("{key} = {shown}").success());
            }
        }

        Ok(())
    }
}

fn show(config: &Config) {
    println!("Configuration:");
    for key in Config::KEYS {
        let value = config.get(key).unwrap_or_default();
        let value = if key == "allowed_types" && value.is_empty() {
            "(all types)".dim()
        } else {
            value
        };
        println!("  {key}: {value}");
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown configuration key: '{key}'\nSupported keys: {}",
        Config::KEYS.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::tempdir;

    use super::*;

    fn run(root: &Path, args: &[&str]) -> anyhow::Result<()> {
        Command::parse_from(std::iter::once("config").chain(args.iter().copied())).run(root)
    }

    #[test]
    fn set_persists_value() {
        let tmp = tempdir().unwrap();
        run(tmp.path(), &["set", "currency_symbol", "Rs "]).unwrap();
        run(tmp.path(), &["set", "require_rejection_reason", "true"]).unwrap();

        let config = Config::load(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.currency_symbol, "Rs ");
        assert!(config.require_rejection_reason);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = run(tmp.path(), &["set", "digits", "3"]).unwrap_err();
        assert!(err.to_string().starts_with("Unknown configuration key"));
        assert!(run(tmp.path(), &["get", "digits"]).is_err());
    }

    #[test]
    fn bad_value_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = run(tmp.path(), &["set", "compact_amounts", "maybe"]).unwrap_err();
        assert!(err.to_string().contains("expects true or false"));
        assert!(!tmp.path().join(CONFIG_FILE).exists());
    }
}
