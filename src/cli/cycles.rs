use std::path::PathBuf;

use clap::Parser;
use tracing::instrument;

use super::{load_items, terminal::Colorize, OutputFormat};

#[derive(Debug, Parser)]
#[command(about = "List items whose parent references form cycles")]
pub struct Cycles {
    /// JSON file holding an array of items
    items: PathBuf,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Cycles {
    /// Prints the cycles and returns whether any were found.
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<bool> {
        const MAX_CYCLE_DISPLAY: usize = 5;

        let items = load_items(&self.items)?;
        let cycles = picker::cycles(&items);

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cycles)?),
            OutputFormat::Table => {
                if cycles.is_empty() {
                    println!("Cycles: {} ✅", "0".success());
                } else {
                    println!("Cycles: {} ⚠️", cycles.len().to_string().warning());
                    for cycle in cycles.iter().take(MAX_CYCLE_DISPLAY) {
                        let members: Vec<String> = cycle.iter().map(ToString::to_string).collect();
                        println!("  - {}", members.join(" -> "));
                    }
                    if cycles.len() > MAX_CYCLE_DISPLAY {
                        println!("  - ... and {} more cycles", cycles.len() - MAX_CYCLE_DISPLAY);
                    }
                    println!(
                        "{}",
                        "Items on a cycle are left out of the option list.".dim()
                    );
                }
            }
        }

        Ok(!cycles.is_empty())
    }
}
