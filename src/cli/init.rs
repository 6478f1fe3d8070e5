use std::path::PathBuf;

use request_desk::{Directory, RequestType};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Restrict submissions to these request types (default: all types)
    #[arg(long = "type", value_name = "TYPE", num_args = 1..)]
    types: Vec<RequestType>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root).init()?;

        if !self.types.is_empty() {
            let mut config = directory.config().clone();
            for request_type in self.types {
                config.add_type(request_type);
            }
            directory
                .update_config(config)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
        }

        println!(
            "{}",
            format!(
                "Initialized request directory in {}",
                directory.root().display()
            )
            .success()
        );
        println!("  Created: config.toml");
        println!("  Created: requests/");

        let allowed = directory.config().allowed_types();
        if !allowed.is_empty() {
            let names: Vec<_> = allowed.iter().map(ToString::to_string).collect();
            println!("  Allowed types: {}", names.join(", "));
        }

        println!();
        println!("Next steps:");
        println!(
            "  desk submit loan --name \"Asha Rao\" --employee-id EMP-001 --department Finance \
             -f amount=200000 -f purpose=Education"
        );
        println!("  desk list --view loan");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use request_desk::{
        Config,
        storage::directory::{CONFIG_FILE, REQUESTS_DIR},
    };
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn creates_layout_with_allowed_types() {
        let tmp = tempdir().unwrap();
        Command::parse_from(["init", "--type", "loan", "asset"])
            .run(tmp.path().to_path_buf())
            .unwrap();

        assert!(tmp.path().join(REQUESTS_DIR).is_dir());
        let config = Config::load(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(
            config.allowed_types(),
            &[RequestType::Loan, RequestType::Asset]
        );
    }

    #[test]
    fn refuses_to_initialise_twice() {
        let tmp = tempdir().unwrap();
        Command::parse_from(["init"])
            .run(tmp.path().to_path_buf())
            .unwrap();
        assert!(
            Command::parse_from(["init"])
                .run(tmp.path().to_path_buf())
                .is_err()
        );
    }
}
