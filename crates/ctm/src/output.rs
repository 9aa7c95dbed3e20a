//! Output formatting for scan results

use ctm_core::ScanResult;
use eyre::Result;
use owo_colors::{OwoColorize, Stream};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render scan results in the specified format
pub fn render_report(result: &ScanResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(result)),
        OutputFormat::Json => render_json(result),
    }
}

fn render_text(result: &ScanResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} Traced tests ({})\n",
        "##".if_supports_color(Stream::Stdout, |t| t.bold()),
        result.records.len()
    ));

    if result.records.is_empty() {
        output.push_str("  No test methods with trace markers found\n");
        return output;
    }

    output.push('\n');

    for record in &result.records {
        let items: Vec<String> = record
            .backlog_items
            .iter()
            .map(|item| item.to_string())
            .collect();

        output.push_str(&format!(
            "  {} {}.{} -> {}\n",
            "-".if_supports_color(Stream::Stdout, |t| t.green()),
            record
                .test
                .class_name
                .if_supports_color(Stream::Stdout, |t| t.cyan()),
            record.test.method,
            items
                .join(", ")
                .if_supports_color(Stream::Stdout, |t| t.yellow())
        ));
        output.push_str(&format!(
            "      {}\n",
            record
                .test
                .file_url
                .if_supports_color(Stream::Stdout, |t| t.dimmed())
        ));
    }

    output
}

fn render_json(result: &ScanResult) -> Result<String> {
    facet_json::to_string_pretty(&result.records)
        .map_err(|e| eyre::eyre!("Failed to serialize scan results: {:?}", e))
}
