use std::path::PathBuf;

use anyhow::Context;
use request_desk::{Employee, NewRequest, Priority, RequestData, RequestType};
use serde_json::{Map, Value};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The request type, e.g. loan, asset, interview, mrf, grievance
    request_type: RequestType,

    /// Submitting employee's name
    #[arg(long, short)]
    name: String,

    /// Submitting employee's id
    #[arg(long, short = 'e')]
    employee_id: String,

    /// Submitting employee's department
    #[arg(long, short)]
    department: String,

    /// Short title
    #[arg(long, short, default_value = "")]
    title: String,

    /// Longer description
    #[arg(long, default_value = "")]
    description: String,

    /// Review priority (high, medium, low)
    #[arg(long, short, default_value = "medium")]
    priority: Priority,

    /// A payload field as KEY=VALUE (repeatable)
    ///
    /// Values that parse as JSON (numbers, booleans, arrays) are stored as
    /// such; anything else is stored as text.
    /// Example: -f amount=200000 -f purpose=Education
    #[arg(long = "field", short = 'f', value_name = "KEY=VALUE", value_parser = parse_field)]
    fields: Vec<(String, Value)>,

    /// The whole payload as a JSON object. Fields given with -f override it.
    #[arg(long, value_name = "JSON")]
    data: Option<String>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = super::open(root)?;

        let payload = self.payload()?;
        let new = NewRequest::new(
            Employee::new(self.name, self.employee_id, self.department),
            RequestData::from_parts(self.request_type, payload),
        )
        .title(self.title)
        .description(self.description)
        .priority(self.priority);

        let request = directory.add_request(new)?;

        println!(
            "{}",
            format!(
                "Submitted {} request {}",
                request.request_type(),
                request.id().short()
            )
            .success()
        );
        if let Some(amount) = request.amount() {
            println!("  Amount: {}", super::money(directory.config(), amount));
        }
        Ok(())
    }

    fn payload(&self) -> anyhow::Result<Value> {
        let mut payload = match &self.data {
            Some(json) => match serde_json::from_str(json).context("--data is not valid JSON")? {
                Value::Object(map) => map,
                _ => anyhow::bail!("--data must be a JSON object"),
            },
            None => Map::new(),
        };

        for (key, value) in &self.fields {
            payload.insert(key.clone(), value.clone());
        }

        Ok(Value::Object(payload))
    }
}

/// Parses `KEY=VALUE`, reading the value as JSON when possible.
fn parse_field(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{s}'"));
    }

    let value = serde_json::from_str(value.trim()).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
