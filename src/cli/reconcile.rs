use std::path::PathBuf;

use clap::Parser;
use picker::{domain::options_from_items, reconcile, Config, ItemId, SelectionRecord, View};
use tracing::{instrument, warn};

use super::{load_items, options::print_table, terminal::Colorize, OutputFormat};

#[derive(Debug, Parser)]
#[command(about = "Show what the picker displays for a selection and search")]
pub struct Reconcile {
    /// JSON file holding an array of items
    items: PathBuf,

    /// The currently selected parent
    #[arg(long, value_name = "ID")]
    selected: Option<ItemId>,

    /// Text in the picker's input
    #[arg(long, default_value = "")]
    search: String,

    /// JSON file holding the selected parent's record
    ///
    /// Defaults to looking the selection up in the items file.
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Reconcile {
    /// Resolves the selection record and reconciles the options.
    ///
    /// `--record` takes precedence over looking the selection up in the
    /// items file.
    pub fn view(&self, config: &Config) -> anyhow::Result<View> {
        let items = load_items(&self.items)?;

        let record = match (&self.record, self.selected) {
            (Some(path), _) => Some(picker::storage::load_record(path).map_err(|e| {
                anyhow::anyhow!("Failed to load record from {}: {e}", path.display())
            })?),
            (None, Some(selected)) => items
                .iter()
                .find(|item| item.id == selected)
                .map(SelectionRecord::from),
            (None, None) => None,
        };

        if let (Some(selected), None) = (self.selected, &record) {
            warn!(%selected, "no record found for the selected parent");
        }

        let options = options_from_items(&items, config.indent());
        Ok(reconcile(options, self.selected, record.as_ref(), &self.search))
    }

    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let view = self.view(config)?;

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
            OutputFormat::Table => {
                println!("{} {}", "Input:".dim(), view.input_text);
                match view.selected() {
                    Some(option) => println!("{} {}", "Selected:".dim(), option.key),
                    None => match view.provisional() {
                        Some(option) => println!(
                            "{} {} {}",
                            "Selected:".dim(),
                            "none".warning(),
                            format!("(showing {})", option.key).dim()
                        ),
                        None => println!("{} {}", "Selected:".dim(), "none".warning()),
                    },
                }
                println!();
                let marked = view.selected_index.or(if view.options.is_empty() {
                    None
                } else {
                    Some(0)
                });
                print_table(&view.options, marked);
            }
        }

        Ok(())
    }
}
