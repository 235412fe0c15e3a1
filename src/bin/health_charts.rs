use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueHint};
use tracing::debug;

use health_charts::{ChartConfig, ChartResult, DEFAULT_CONFIG_FILE, init_logging, parse_period, render_graph};

#[derive(Debug, Parser)]
#[command(author, version, about = "Draw a health chart from the configured marker files", long_about = None)]
struct Cli {
    /// Graph to draw, as named in the configuration
    graph: String,

    /// Optional period: YYYYMM-YYYYMM, YYYYMM- or -YYYYMM
    #[arg(allow_negative_numbers = true)]
    period: Option<String>,

    /// Configuration file
    #[arg(short, long, env = "HEALTH_CHARTS_CONFIG", default_value = DEFAULT_CONFIG_FILE, value_hint = ValueHint::FilePath)]
    config: PathBuf,

    /// Output image, defaults to `<graph>.png`
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn run(cli: &Cli) -> ChartResult<PathBuf> {
    let period = cli.period.as_deref().map(parse_period).transpose()?;
    let config = ChartConfig::load(&cli.config)?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.png", cli.graph)));

    debug!(graph = %cli.graph, period = ?period, config = %cli.config.display(), "rendering");
    render_graph(&config, &cli.graph, period.as_ref(), &output)?;
    Ok(output)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(output) => {
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
