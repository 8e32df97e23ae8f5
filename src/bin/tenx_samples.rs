use std::io;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use tenx_samples::app::{App, DEFAULT_AGGR_FILE, DEFAULT_TABLE_FILE, LogSink, ProgressSink};
use tenx_samples::config::{ConfigLoader, ConfigOverrides};
use tenx_samples::error::SampleError;
use tenx_samples::output::{JsonOutput, OutputMode, TextOutput};

#[derive(Parser)]
#[command(name = "tenx-samples")]
#[command(about = "Validate 10x sample manifests and build the cellranger sample table")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Validate the *.sample manifests without writing anything")]
    Check(ManifestArgs),
    #[command(about = "Write the sample information table")]
    Table(TableArgs),
    #[command(about = "Write the cellranger aggr specification from a sample table")]
    Aggr(AggrArgs),
    #[command(about = "Show the cellranger count inputs for one manifest")]
    Runs(RunsArgs),
    #[command(about = "List the distinct sample ids of a sample table")]
    SampleIds(SampleIdsArgs),
}

#[derive(Args, Clone)]
struct ManifestArgs {
    #[arg(long)]
    config: Option<String>,

    /// Comma-separated titles of the underscore-separated name fields.
    #[arg(long)]
    name_fields: Option<String>,

    /// Comma-separated name fields joined to form the sample id.
    #[arg(long)]
    sample_fields: Option<String>,

    #[arg(long)]
    data_dir: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct TableArgs {
    #[command(flatten)]
    manifests: ManifestArgs,

    #[arg(long, default_value = DEFAULT_TABLE_FILE)]
    out: Utf8PathBuf,
}

#[derive(Args)]
struct AggrArgs {
    #[arg(long, default_value = DEFAULT_TABLE_FILE)]
    table: Utf8PathBuf,

    #[arg(long, default_value = DEFAULT_AGGR_FILE)]
    out: Utf8PathBuf,
}

#[derive(Args)]
struct RunsArgs {
    manifest: Utf8PathBuf,

    #[command(flatten)]
    manifests: ManifestArgs,
}

#[derive(Args)]
struct SampleIdsArgs {
    #[arg(long, default_value = DEFAULT_TABLE_FILE)]
    table: Utf8PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<SampleError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SampleError) -> u8 {
    if error.is_validation() {
        2
    } else if error.is_config() {
        3
    } else {
        1
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let sink: &dyn ProgressSink = match output_mode {
        OutputMode::Json => &JsonOutput,
        OutputMode::Text => &LogSink,
    };

    match cli.command {
        Commands::Check(args) => {
            let app = build_app(args)?;
            let result = app.check(sink)?;
            emit(output_mode, &result, TextOutput::print_check)
        }
        Commands::Table(args) => {
            let app = build_app(args.manifests)?;
            let result = app.write_table(&args.out, sink)?;
            emit(output_mode, &result, TextOutput::print_table)
        }
        Commands::Aggr(args) => {
            let result = App::write_aggr(&args.table, &args.out, sink)?;
            emit(output_mode, &result, TextOutput::print_aggr)
        }
        Commands::Runs(args) => {
            let app = build_app(args.manifests)?;
            let inputs = app.run_inputs(&args.manifest)?;
            emit(output_mode, &inputs, TextOutput::print_runs)
        }
        Commands::SampleIds(args) => {
            let result = App::sample_ids(&args.table)?;
            emit(output_mode, &result, TextOutput::print_sample_ids)
        }
    }
}

fn emit<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text: fn(&T) -> io::Result<()>,
) -> miette::Result<()> {
    let printed = match mode {
        OutputMode::Json => JsonOutput::print(value),
        OutputMode::Text => text(value),
    };
    printed.into_diagnostic()
}

fn build_app(args: ManifestArgs) -> Result<App, SampleError> {
    let overrides = ConfigOverrides {
        name_fields: args.name_fields,
        sample_fields: args.sample_fields,
        data_dir: args.data_dir,
    };
    let config = ConfigLoader::resolve_with_overrides(args.config.as_deref(), overrides)?;
    Ok(App::new(config))
}
