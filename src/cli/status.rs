use std::path::PathBuf;

use clap::Parser;
use request_desk::{Config, Dashboard, ViewStats};
use serde_json::json;
use tracing::instrument;

use super::terminal::{Colorize, is_narrow};

#[derive(Debug, Parser, Default)]
#[command(about = "Show per-department request counts and approved totals")]
pub struct Command {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = super::open(root)?;
        let dashboard = Dashboard::compute(directory.requests());
        let config = directory.config();

        if dashboard.overall.total == 0 && !matches!(self.output, OutputFormat::Json) {
            println!("No requests yet. Submit one with 'desk submit'.");
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => Self::output_json(&dashboard, config)?,
            OutputFormat::Table => {
                if self.quiet {
                    Self::output_quiet(&dashboard.overall);
                } else {
                    Self::output_table(&dashboard, config);
                }
            }
        }

        Ok(())
    }

    fn output_json(dashboard: &Dashboard, config: &Config) -> anyhow::Result<()> {
        let output = json!({
            "types": dashboard.by_type,
            "overall": dashboard.overall,
            "approvedAmountDisplay": super::money(config, dashboard.overall.approved_amount),
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(overall: &ViewStats) {
        println!(
            "total={} pending={} approved={} rejected={} closed={} approved_amount={}",
            overall.total,
            overall.pending,
            overall.approved,
            overall.rejected,
            overall.closed,
            overall.approved_amount
        );
    }

    fn output_table(dashboard: &Dashboard, config: &Config) {
        println!("Request counts");
        println!("{}", "──────────────".dim());

        if is_narrow() {
            // Stacked output for narrow terminals
            for (request_type, stats) in &dashboard.by_type {
                println!(
                    "{request_type}: {} pending, {} processed, {} approved",
                    stats.pending,
                    stats.processed(),
                    super::money(config, stats.approved_amount)
                );
            }
        } else {
            println!(
                "{:<14} {:>6} {:>8} {:>9} {:>9} {:>7}  Approved",
                "Type", "Total", "Pending", "Approved", "Rejected", "Closed"
            );
            for (request_type, stats) in &dashboard.by_type {
                println!(
                    "{:<14} {:>6} {:>8} {:>9} {:>9} {:>7}  {}",
                    request_type.as_str(),
                    stats.total,
                    stats.pending,
                    stats.approved,
                    stats.rejected,
                    stats.closed,
                    super::money(config, stats.approved_amount)
                );
            }
        }

        let overall = &dashboard.overall;
        println!();
        println!("Total requests: {}", overall.total);
        if overall.pending == 0 {
            println!("Awaiting review: {} ✅", "0".success());
        } else {
            println!(
                "Awaiting review: {} ({})",
                overall.pending.to_string().warning(),
                super::money(config, overall.pending_amount).dim()
            );
            println!("{}", "Run 'desk list --pending' to review them.".dim());
        }
        println!(
            "Approved value: {}",
            super::money(config, overall.approved_amount).success()
        );
    }
}

#[cfg(test)]
mod tests {
    use request_desk::{Directory, Employee, NewRequest, RequestData, RequestType};
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn requires_an_initialised_directory() {
        let tmp = tempdir().unwrap();
        assert!(Command::default().run(tmp.path().to_path_buf()).is_err());
    }

    #[test]
    fn renders_empty_and_populated_dashboards() {
        let tmp = tempdir().unwrap();
        let mut directory = Directory::new(tmp.path().to_path_buf()).init().unwrap();
        Command::default().run(tmp.path().to_path_buf()).unwrap();

        let id = directory
            .add_request(NewRequest::new(
                Employee::new("Meera Nair", "EMP-720", "Engineering"),
                RequestData::from_parts(RequestType::Loan, json!({"amount": 250_000})),
            ))
            .unwrap()
            .id();
        directory.approve(id).unwrap();

        let cases: [&[&str]; 3] = [
            &["status"],
            &["status", "--quiet"],
            &["status", "--output", "json"],
        ];
        for args in cases {
            Command::parse_from(args.iter().copied())
                .run(tmp.path().to_path_buf())
                .unwrap();
        }
    }
}
