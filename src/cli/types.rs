use std::path::Path;

use request_desk::{Directory, RequestType, storage::directory::CONFIG_FILE};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: TypesCommand,
}

#[derive(Debug, clap::Parser)]
enum TypesCommand {
    /// Add one or more request types to the allowed list
    Add {
        /// The types to add (e.g. loan, asset, insurance)
        #[arg(num_args = 1..)]
        types: Vec<RequestType>,
    },

    /// Remove one or more request types from the allowed list
    Remove {
        /// The types to remove
        #[arg(num_args = 1..)]
        types: Vec<RequestType>,
    },

    /// List the allowed request types
    List,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            anyhow::bail!(
                "Request directory not initialized. Run 'desk init' first or pass --root"
            );
        }
        let mut config = super::load_config(&config_path)?;

        match self.command {
            TypesCommand::Add { types } => {
                let (added, existing): (Vec<_>, Vec<_>) =
                    types.into_iter().partition(|t| config.add_type(t.clone()));
                config
                    .save(&config_path)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
                report("Added", &added, "Already allowed", &existing);
            }
            TypesCommand::Remove { types } => {
                let (removed, missing): (Vec<_>, Vec<_>) =
                    types.into_iter().partition(|t| config.remove_type(t));
                config
                    .save(&config_path)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
                report("Removed", &removed, "Not in the list", &missing);

                let outstanding = Directory::new(root.to_path_buf())
                    .load_all()?
                    .requests()
                    .iter()
                    .filter(|r| r.is_pending() && removed.contains(&r.request_type()))
                    .count();
                if outstanding > 0 {
                    println!(
                        "{}",
                        format!(
                            "⚠️  {outstanding} pending request(s) of removed types remain open"
                        )
                        .warning()
                    );
                }
            }
            TypesCommand::List => {
                if config.allowed_types().is_empty() {
                    println!("All request types are allowed.");
                    let known: Vec<_> =
                        RequestType::KNOWN.iter().map(ToString::to_string).collect();
                    println!("{}", format!("Known types: {}", known.join(", ")).dim());
                } else {
                    for request_type in config.allowed_types() {
                        println!("{request_type}");
                    }
                }
            }
        }

        Ok(())
    }
}

fn report(done: &str, changed: &[RequestType], skipped: &str, unchanged: &[RequestType]) {
    let join = |types: &[RequestType]| {
        types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    if !changed.is_empty() {
        println!(
            "{}",
            format!("✅ {done} {} type(s): {}", changed.len(), join(changed)).success()
        );
    }
    if !unchanged.is_empty() {
        println!("{}", format!("ℹ️  {skipped}: {}", join(unchanged)).dim());
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use request_desk::Config;
    use tempfile::tempdir;

    use super::*;

    fn run(root: &Path, args: &[&str]) -> anyhow::Result<()> {
        Command::parse_from(std::iter::once("types").chain(args.iter().copied())).run(root)
    }

    #[test]
    fn add_and_remove_types() {
        let tmp = tempdir().unwrap();
        Directory::new(tmp.path().to_path_buf()).init().unwrap();

        run(tmp.path(), &["add", "loan", "Insurance"]).unwrap();
        let config = Config::load(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(
            config.allowed_types(),
            &[RequestType::Loan, "insurance".parse().unwrap()]
        );

        run(tmp.path(), &["remove", "loan"]).unwrap();
        let config = Config::load(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.allowed_types().len(), 1);
    }

    #[test]
    fn invalid_type_is_rejected_by_the_parser() {
        assert!(Command::try_parse_from(["types", "add", "9lives"]).is_err());
    }

    #[test]
    fn requires_initialised_directory() {
        let tmp = tempdir().unwrap();
        assert!(run(tmp.path(), &["list"]).is_err());
    }
}
