//! Allocation CLI binary.
//!
//! Lists the built-in strategies, describes their parameters and runs them
//! on CSV price tables.

mod cmd;
mod data;

use std::path::PathBuf;
use std::process;

use allocation_factory::OutputCheck;
use allocation_traits::PriceLayout;
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use cmd::predict::PredictOptions;

#[derive(Parser)]
#[command(name = "allocation")]
#[command(about = "Run portfolio allocation strategies", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    log_verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available strategies
    Strategies {
        /// Show declared parameters
        #[arg(long)]
        verbose: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
    },

    /// Show an allocator's inputs, outputs and parameters
    Describe {
        /// Strategy name
        strategy: String,
    },

    /// Compute weights from a CSV price table
    Predict {
        /// Strategy name
        strategy: String,

        /// CSV file: header of asset names, one row per time step
        #[arg(short, long)]
        prices: PathBuf,

        /// Strategy parameter as key=value (repeatable)
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// JSON object of parameters; --param values take precedence
        #[arg(long)]
        params_file: Option<PathBuf>,

        /// Price layout handed to the strategy
        #[arg(long, value_enum, default_value_t = LayoutArg::AssetsByTime)]
        layout: LayoutArg,

        /// Validation applied to the returned weights
        #[arg(long, value_enum, default_value_t = CheckArg::None)]
        check: CheckArg,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    AssetsByTime,
    TimeByAssets,
}

impl From<LayoutArg> for PriceLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::AssetsByTime => Self::AssetsByTime,
            LayoutArg::TimeByAssets => Self::TimeByAssets,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CheckArg {
    None,
    Shape,
    Sum,
}

impl From<CheckArg> for OutputCheck {
    fn from(arg: CheckArg) -> Self {
        match arg {
            CheckArg::None => Self::None,
            CheckArg::Shape => Self::Shape,
            CheckArg::Sum => Self::sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_verbosity);

    match cli.command {
        Commands::Strategies { verbose, format } => {
            cmd::strategies::list_strategies(verbose, format == FormatArg::Json)?;
        }
        Commands::Describe { strategy } => {
            cmd::describe::describe_strategy(&strategy)?;
        }
        Commands::Predict {
            strategy,
            prices,
            params,
            params_file,
            layout,
            check,
            format,
        } => {
            cmd::predict::run_prediction(&PredictOptions {
                strategy: &strategy,
                prices: &prices,
                params: &params,
                params_file: params_file.as_deref(),
                layout: layout.into(),
                check: check.into(),
                json: format == FormatArg::Json,
            })?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
