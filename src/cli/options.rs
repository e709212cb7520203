use std::path::PathBuf;

use clap::Parser;
use picker::{domain::options_from_items, Config, SelectOption};
use tracing::instrument;

use super::{
    load_items,
    terminal::{terminal_width, truncate, Colorize},
    OutputFormat,
};

#[derive(Debug, Parser)]
#[command(about = "Print the indented option list for a collection")]
pub struct Options {
    /// JSON file holding an array of items
    items: PathBuf,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Options {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let items = load_items(&self.items)?;
        let options = options_from_items(&items, config.indent());

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&options)?),
            OutputFormat::Table => print_table(&options, None),
        }

        Ok(())
    }
}

/// Prints one option per line, marking the option at `marked`.
pub fn print_table(options: &[SelectOption], marked: Option<usize>) {
    if options.is_empty() {
        println!("{}", "No options.".dim());
        return;
    }

    let width = options
        .iter()
        .map(|option| option.key.to_string().len())
        .max()
        .unwrap_or(0);

    // Marker, key and two spaces precede each label.
    let room = terminal_width().map(|columns| usize::from(columns).saturating_sub(width + 3));

    for (index, option) in options.iter().enumerate() {
        let key = format!("{:>width$}", option.key);
        let label = room.map_or_else(|| option.label.clone(), |room| truncate(&option.label, room));
        if Some(index) == marked {
            println!("{} {} {}", "▸".success(), key.dim(), label.success());
        } else {
            println!("  {} {}", key.dim(), label);
        }
    }
}
