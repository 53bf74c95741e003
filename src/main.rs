use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vibe_sheets::average::{self, AverageJob};
use vibe_sheets::layout::Layout;
use vibe_sheets::sync;
use vibe_sheets::{Result, ToolError};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Operate(args) => execute_operate(args),
        Command::Average(args) => execute_average(args),
    }
}

fn execute_operate(args: OperateArgs) -> Result<()> {
    let layout = match &args.layout {
        Some(path) => Layout::from_path(path)?,
        None => Layout::default(),
    };

    let outcome = sync::operate_file(&args.input, &layout)?;
    println!("saved: {}", outcome.output.display());
    println!("copied sheets:");
    for name in &outcome.report.created {
        println!(" - {name}");
    }
    Ok(())
}

fn execute_average(args: AverageArgs) -> Result<()> {
    let mut job = AverageJob {
        cell: args.cell,
        output_sheet: args.output_sheet,
        ..AverageJob::default()
    };
    if !args.sheets.is_empty() {
        job.sheets = args.sheets;
    }

    let value = average::average_file(&args.input, &args.output, &job)?;
    println!(
        "saved: {} (sheet '{}', {} = {value})",
        args.output.display(),
        job.output_sheet,
        job.cell
    );
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Prepare vibration measurement workbooks: copy sheets, paste values, draw charts."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Duplicate the measurement sheets, paste baseline values and build the chart sheets.
    Operate(OperateArgs),
    /// Average one cell across several sheets into a new workbook.
    Average(AverageArgs),
}

#[derive(clap::Args)]
struct OperateArgs {
    /// Workbook to process (.xlsx or .xlsm).
    input: PathBuf,

    /// JSON file overriding sheet names, ranges or chart style.
    #[arg(long)]
    layout: Option<PathBuf>,
}

#[derive(clap::Args)]
struct AverageArgs {
    /// Workbook to read (.xlsx or .xlsm).
    input: PathBuf,

    /// Output workbook path.
    #[arg(long, default_value = average::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Cell read from every sheet and written in the output.
    #[arg(long, default_value = "B11")]
    cell: String,

    /// Sheet to read; repeat for several. Defaults to sheets 1 through 5.
    #[arg(long = "sheet")]
    sheets: Vec<String>,

    /// Name of the single sheet in the output workbook.
    #[arg(long, default_value = "6")]
    output_sheet: String,
}
