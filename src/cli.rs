use std::{
    path::{Path, PathBuf},
    process,
};

mod cycles;
mod options;
mod reconcile;
mod terminal;

use clap::ArgAction;
use cycles::Cycles;
use options::Options;
use picker::Config;
use reconcile::Reconcile;
use tracing::debug;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(self.config.as_deref())?;
        let code = self.command.run(&config)?;
        if code != 0 {
            process::exit(code);
        }
        Ok(())
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

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    debug!(path = %path.display(), "loading configuration");
    Config::load(path)
        .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {e}", path.display()))
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Print the indented option list for a collection
    Options(Options),

    /// Show what the picker displays for a selection and search
    ///
    /// The selection stays visible in the list unless a search is active.
    Reconcile(Reconcile),

    /// List items whose parent references form cycles
    ///
    /// Items on a cycle are left out of the option list.
    Cycles(Cycles),
}

/// Exit code when the items contain parent cycles.
const CYCLES_FOUND: i32 = 3;

impl Command {
    /// Runs the subcommand and returns the process exit code.
    fn run(self, config: &Config) -> anyhow::Result<i32> {
        match self {
            Self::Options(command) => command.run(config)?,
            Self::Reconcile(command) => command.run(config)?,
            Self::Cycles(command) => {
                if command.run()? {
                    return Ok(CYCLES_FOUND);
                }
            }
        }
        Ok(0)
    }
}

/// Output format shared by the subcommands.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn load_items(path: &Path) -> anyhow::Result<Vec<picker::Item>> {
    picker::storage::load_items(path)
        .map_err(|e| anyhow::anyhow!("Failed to load items from {}: {e}", path.display()))
}
