use std::path::{Path, PathBuf};

mod complete;
mod config;
mod decide;
mod init;
mod list;
mod show;
mod status;
mod submit;
mod terminal;
mod types;

use clap::ArgAction;
use request_desk::{
    Config, Directory,
    domain::{Money, RequestId},
    storage::directory::Loaded,
};
use rust_decimal::Decimal;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the request directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.unwrap_or_default().run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show per-department request counts and totals (default)
    Status(status::Command),

    /// Initialize a new request directory
    Init(init::Command),

    /// Submit a new request
    Submit(submit::Command),

    /// List requests through a department view
    List(list::Command),

    /// Show a single request in detail
    Show(show::Command),

    /// Approve a pending request
    Approve(decide::Command),

    /// Reject a pending request
    Reject(decide::Reject),

    /// Mark a scheduled interview as held
    Complete(decide::Command),

    /// Call off a scheduled interview
    Cancel(decide::Command),

    /// Show or modify configuration settings
    Config(config::Command),

    /// Manage the request types that may be submitted
    Types(types::Command),

    /// Generate shell completions
    Completions(complete::Command),
}

impl Default for Command {
    fn default() -> Self {
        Self::Status(status::Command::default())
    }
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Init(command) => command.run(root)?,
            Self::Submit(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Approve(command) => command.run(root, decide::Verb::Approve)?,
            Self::Reject(command) => command.run(root)?,
            Self::Complete(command) => command.run(root, decide::Verb::Complete)?,
            Self::Cancel(command) => command.run(root, decide::Verb::Cancel)?,
            Self::Config(command) => command.run(&root)?,
            Self::Types(command) => command.run(&root)?,
            Self::Completions(command) => command.run(),
        }
        Ok(())
    }
}

/// Loads a directory that has been initialised with `desk init`.
fn open(root: PathBuf) -> anyhow::Result<Directory<Loaded>> {
    let unloaded = Directory::new(root);
    if !unloaded.config_path().exists() {
        anyhow::bail!(
            "{} is not a request directory. Run 'desk init' first or pass --root",
            unloaded.root().display()
        );
    }
    Ok(unloaded.load_all()?)
}

/// Resolves a full id or unique id prefix given on the command line.
fn resolve(directory: &Directory<Loaded>, id: &str) -> anyhow::Result<RequestId> {
    Ok(directory.resolve(id)?)
}

/// Formats an amount using the directory's currency settings.
fn money(config: &Config, amount: Decimal) -> String {
    Money::new(amount, &config.currency_symbol, config.amount_style()).to_string()
}

/// Loads the configuration at `path`, or the default if it doesn't exist.
fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        Config::load(path).map_err(|e| anyhow::anyhow!("{e}"))
    } else {
        Ok(Config::default())
    }
}
