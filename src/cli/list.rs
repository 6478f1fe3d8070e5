use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use regex::Regex;
use request_desk::{
    Config, Request, Status,
    domain::{
        Board, Projection, ViewRow, project,
        view::{AllRequestsView, AssetView, GrievanceView, InterviewView, LoanView, MrfView},
    },
};
use serde::Serialize;
use tracing::instrument;

use super::terminal::{Colorize, is_narrow, status_cell};

const DEFAULT_LIMIT: usize = 200;

/// Command arguments for `desk list`.
#[derive(Debug, Parser)]
pub struct Command {
    /// Department view to list through (default: all requests).
    #[arg(long, value_enum, default_value_t)]
    view: ViewKind,

    /// Filter by status (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "STATUS")]
    status: Vec<Status>,

    /// Show only requests awaiting review.
    #[arg(long, conflicts_with = "status")]
    pending: bool,

    /// Case-insensitive substring match against employee name, employee id
    /// and the view's key field.
    #[arg(long, short, conflicts_with = "regex")]
    search: Option<String>,

    /// Regular expression match against the same fields as --search.
    #[arg(long)]
    regex: Option<String>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and print tab-separated rows for scripting.
    #[arg(long)]
    quiet: bool,

    /// Limit number of rows returned.
    #[arg(long)]
    limit: Option<usize>,

    /// Skip the first N rows.
    #[arg(long)]
    offset: Option<usize>,
}

/// The department views available on the command line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum ViewKind {
    #[default]
    All,
    Loan,
    Asset,
    Interview,
    Mrf,
    Grievance,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Row predicates built from the command line.
#[derive(Debug, Clone, Default)]
struct Filters {
    statuses: Vec<Status>,
    pending: bool,
    search: Option<String>,
    regex: Option<Regex>,
}

impl Filters {
    fn new(cmd: &Command) -> anyhow::Result<Self> {
        let regex = match &cmd.regex {
            Some(pattern) => Some(
                Regex::new(&format!("(?i){pattern}"))
                    .with_context(|| format!("invalid regex: {pattern}"))?,
            ),
            None => None,
        };

        Ok(Self {
            statuses: cmd.status.clone(),
            pending: cmd.pending,
            search: cmd.search.clone(),
            regex,
        })
    }

    fn matches<D>(&self, row: &ViewRow<D>) -> bool {
        if self.pending && !row.is_pending() {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&row.status) {
            return false;
        }
        if let Some(query) = &self.search {
            if !row.matches(query) {
                return false;
            }
        }
        if let Some(regex) = &self.regex {
            if !row.search_fields().iter().any(|field| regex.is_match(field)) {
                return false;
            }
        }
        true
    }
}

impl Command {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = super::open(root)?;
        let filters = Filters::new(&self)?;
        let requests = directory.requests();
        let config = directory.config();

        match self.view {
            ViewKind::All => self.render::<AllRequestsView>(requests, &filters, config),
            ViewKind::Loan => self.render::<LoanView>(requests, &filters, config),
            ViewKind::Asset => self.render::<AssetView>(requests, &filters, config),
            ViewKind::Interview => self.render::<InterviewView>(requests, &filters, config),
            ViewKind::Mrf => self.render::<MrfView>(requests, &filters, config),
            ViewKind::Grievance => self.render::<GrievanceView>(requests, &filters, config),
        }
    }

    fn render<P: Projection>(
        &self,
        requests: &[Request],
        filters: &Filters,
        config: &Config,
    ) -> anyhow::Result<()> {
        let rows = apply_offset_limit(
            project::<P>(requests).retain(|row| filters.matches(row)),
            self.offset,
            self.limit
                .and_then(|value| (value > 0).then_some(value))
                .or(Some(DEFAULT_LIMIT)),
        );

        match self.output {
            OutputFormat::Json => render_json(&rows),
            OutputFormat::Table => {
                if rows.is_empty() {
                    if !self.quiet {
                        println!("{}", format!("{}: no matching requests.", P::NAME).dim());
                    }
                } else {
                    render_table::<P::Detail>(&rows, config, self.quiet);
                }
                Ok(())
            }
        }
    }
}

fn apply_offset_limit<D: Clone>(
    board: Board<D>,
    offset: Option<usize>,
    limit: Option<usize>,
) -> Vec<ViewRow<D>> {
    let rows = board.rows().iter().cloned();
    let rows = rows.skip(offset.unwrap_or(0));
    match limit {
        Some(max) => rows.take(max).collect(),
        None => rows.collect(),
    }
}

fn render_table<D>(rows: &[ViewRow<D>], config: &Config, quiet: bool) {
    let amount = |row: &ViewRow<D>| {
        row.amount
            .map_or_else(String::new, |amount| super::money(config, amount))
    };

    if quiet {
        for row in rows {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                row.id,
                row.request_type,
                row.employee_id,
                row.status,
                amount(row)
            );
        }
        return;
    }

    if is_narrow() {
        // Stacked output for narrow terminals
        for row in rows {
            println!(
                "{} {} {}",
                row.id.short(),
                row.request_type,
                status_cell(row.status, 0)
            );
            println!("  {} ({})", row.employee_name, row.employee_id);
            println!("  {}", row.search_fields()[2].dim());
        }
        return;
    }

    let headers = ["ID", "TYPE", "EMPLOYEE", "EMP ID", "SUBJECT", "AMOUNT", "STATUS"];
    let data: Vec<[String; 6]> = rows
        .iter()
        .map(|row| {
            [
                row.id.short(),
                row.request_type.to_string(),
                row.employee_name.clone(),
                row.employee_id.clone(),
                row.search_fields()[2].to_string(),
                amount(row),
            ]
        })
        .collect();

    // Determine column widths for alignment.
    let widths: Vec<usize> = (0..6)
        .map(|idx| {
            data.iter()
                .map(|cells| cells[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(headers[idx].len())
        })
        .collect();

    for (header, &width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!("{}", headers[6]);
    for &width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!("{:-<8}", "");

    for (cells, row) in data.iter().zip(rows) {
        for (value, &width) in cells.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!("{}", status_cell(row.status, 0));
    }
}

fn render_json<D: Serialize>(rows: &[ViewRow<D>]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), rows)
        .context("failed to render json output")?;
    println!();
    Ok(())
}
