use std::path::PathBuf;

use clap::Parser;
use request_desk::{Config, Request, storage::RequestRecord};
use serde_json::Value;
use tracing::instrument;

use super::terminal::{Colorize, status_cell};

#[derive(Debug, Parser)]
pub struct Command {
    /// Request id or a unique prefix of it
    id: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = super::open(root)?;
        let id = super::resolve(&directory, &self.id)?;
        let Some(request) = directory.store().get(id) else {
            anyhow::bail!("Request {id} not found");
        };

        match self.output {
            OutputFormat::Pretty => output_pretty(request, directory.config()),
            OutputFormat::Json => output_json(request)?,
        }
        Ok(())
    }
}

fn output_pretty(request: &Request, config: &Config) {
    let title = if request.title().is_empty() {
        "(untitled)"
    } else {
        request.title()
    };
    println!("# {} {}", request.request_type(), request.id().short());
    println!("{title}\n");

    println!("{}", "Metadata".dim());
    println!("  Id:         {}", request.id());
    println!(
        "  Employee:   {} ({}, {})",
        request.employee().name,
        request.employee().id,
        request.employee().department
    );
    println!("  Priority:   {}", request.priority());
    println!(
        "  Submitted:  {}",
        request.created().format("%Y-%m-%d %H:%M UTC")
    );
    println!("  Status:     {}", status_cell(request.status(), 0));
    if let Some(decided_at) = request.decided_at() {
        println!("  Decided:    {}", decided_at.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(reason) = request.reason() {
        println!("  Reason:     {reason}");
    }
    if let Some(amount) = request.amount() {
        println!("  Amount:     {}", super::money(config, amount));
    }
    println!("  ETag:       {}", request.etag().dim());

    if !request.description().is_empty() {
        println!("\n{}", "Description".dim());
        println!("  {}", request.description());
    }

    if let Value::Object(fields) = request.data().to_value() {
        if !fields.is_empty() {
            println!("\n{}", "Details".dim());
            for (key, value) in fields {
                let value = match value {
                    Value::String(text) => text,
                    Value::Array(items) => items
                        .iter()
                        .map(|item| item.as_str().map_or_else(|| item.to_string(), ToString::to_string))
                        .collect::<Vec<_>>()
                        .join(", "),
                    other => other.to_string(),
                };
                println!("  {key}: {value}");
            }
        }
    }
}

fn output_json(request: &Request) -> anyhow::Result<()> {
    let mut value = serde_json::to_value(RequestRecord::from(request))?;
    if let Value::Object(map) = &mut value {
        map.insert("etag".to_string(), Value::String(request.etag()));
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
