use anyhow::Result;

use crate::cli::args::OutputFormat;
use crate::manifest::{QueryResult, Report};

pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Reporter { format }
    }

    pub fn render(&self, report: &Report) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Text => Ok(self.render_text(report)),
        }
    }

    fn render_text(&self, report: &Report) -> String {
        let mut out = String::new();
        for result in &report.results {
            out.push_str(&format_result(result));
            out.push('\n');
        }
        let errors = report.error_count();
        out.push_str(&format!(
            "{} quer{}, {} error{}, {} instantiation{}",
            report.results.len(),
            if report.results.len() == 1 { "y" } else { "ies" },
            errors,
            plural(errors),
            report.instantiations,
            plural(report.instantiations),
        ));
        out.push('\n');
        out
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

pub fn format_result(result: &QueryResult) -> String {
    let mut line = result.query.clone();
    match (&result.value, &result.error) {
        (_, Some(error)) => {
            line.push_str(" - error: ");
            line.push_str(error);
        }
        (Some(serde_json::Value::String(s)), None) => {
            line.push_str(" = ");
            line.push_str(s);
        }
        (Some(value), None) => {
            line.push_str(" = ");
            line.push_str(&value.to_string());
        }
        (None, None) => {}
    }
    if let Some(detail) = &result.detail {
        line.push_str("\n    ");
        line.push_str(detail);
    }
    line
}
