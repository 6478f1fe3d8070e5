//! Shell completions for `desk`.
//!
//! Prints a completion script for bash, zsh, fish, elvish or `PowerShell`,
//! e.g. `desk completions zsh > ~/.zfunc/_desk`.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::Shell;

const BIN_NAME: &str = "desk";

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

impl Command {
    pub fn run(self) {
        write_completions(self.shell, &mut io::stdout());
    }
}

fn write_completions(shell: Shell, out: &mut impl Write) {
    let mut cli = super::Cli::command();
    clap_complete::generate(shell, &mut cli, BIN_NAME, out);
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Shell::Bash)]
    #[test_case(Shell::Zsh)]
    #[test_case(Shell::Fish)]
    fn script_covers_review_commands(shell: Shell) {
        let mut script = Vec::new();
        write_completions(shell, &mut script);
        let script = String::from_utf8(script).unwrap();

        assert!(script.contains(BIN_NAME));
        for subcommand in ["submit", "approve", "reject", "types"] {
            assert!(script.contains(subcommand), "{shell:?} is missing {subcommand}");
        }
    }
}
