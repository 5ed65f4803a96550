//! @ai:module:intent CLI entry point for compiling Pascal sources and annotating their diagnostics
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on config, compiler, correlator, annotation, output

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fpc_annotate::{
    count_lines, feed_reader, format_report, format_workflow_command, shape_annotations,
    CompileOutcome, CompilerInvocation, Config, Correlator, OutputFormat, Report, RunSummary,
};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fpc-annotate")]
#[command(author, version, about = "Compile with Free Pascal and turn its diagnostics into CI annotations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file and report its diagnostics
    Build {
        /// Program or unit to compile
        source: String,

        /// Compiler executable
        #[arg(long)]
        fpc: Option<String>,

        /// Extra compiler flag (repeatable)
        #[arg(long = "flag", allow_hyphen_values = true)]
        flags: Vec<String>,

        /// Message kinds the compiler prints (subset of "ewnh")
        #[arg(long)]
        verbosity: Option<String>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Parse a captured compiler log ("-" for stdin) and report its diagnostics
    Parse {
        /// Log file to read
        #[arg(default_value = "-")]
        log: PathBuf,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Write a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "fpc-annotate.toml")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the compiler runs in and paths are reported relative to
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Buckets that fail the run (subset of "ewnh")
    #[arg(long)]
    fail_on: Option<String>,

    /// Path whose non-error diagnostics are suppressed; end with a separator for directories
    #[arg(long)]
    exclude: Vec<String>,

    /// Emit workflow annotation commands (defaults to on inside GitHub Actions)
    #[arg(long, overrides_with = "no_annotate")]
    annotate: bool,

    /// Never emit workflow annotation commands
    #[arg(long)]
    no_annotate: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fpc_annotate=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            source,
            fpc,
            flags,
            verbosity,
            report,
        } => build(&source, fpc, flags, verbosity, &report),
        Commands::Parse { log, report } => parse_log(&log, &report),
        Commands::Init { output } => init_config(&output),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// @ai:intent Load the config file, if any, and apply command-line overrides
/// @ai:effects fs:read
fn load_config(args: &ReportArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(workdir) = &args.workdir {
        config.workdir = workdir.clone();
    }
    if let Some(fail_on) = &args.fail_on {
        config.fail_on = fail_on.clone();
    }
    config.exclude.extend(args.exclude.iter().cloned());
    if args.annotate {
        config.annotate = Some(true);
    } else if args.no_annotate {
        config.annotate = Some(false);
    }

    Ok(config)
}

/// @ai:intent Compile a source file and report
/// @ai:effects process:spawn, fs:read, io
fn build(
    source: &str,
    fpc: Option<String>,
    flags: Vec<String>,
    verbosity: Option<String>,
    args: &ReportArgs,
) -> Result<ExitCode> {
    let mut config = load_config(args)?;
    if let Some(fpc) = fpc {
        config.fpc = fpc;
    }
    config.flags.extend(flags);
    if let Some(verbosity) = verbosity {
        config.verbosity = verbosity;
    }
    config.validate()?;

    let workdir = config.resolved_workdir()?;
    let mut correlator = Correlator::new(config.exclusion_matcher(&workdir), workdir.clone());
    let invocation = CompilerInvocation::from_config(&config, source, workdir.clone())?;
    let outcome = invocation.run(&mut correlator)?;

    finish_run(correlator, &outcome, &config, &workdir, args.format.into())
}

/// @ai:intent Run the pipeline over a captured log instead of a live compiler
/// @ai:effects fs:read, io
fn parse_log(log: &Path, args: &ReportArgs) -> Result<ExitCode> {
    let config = load_config(args)?;
    config.validate()?;

    let workdir = config.resolved_workdir()?;
    let mut correlator = Correlator::new(config.exclusion_matcher(&workdir), workdir.clone());

    let outcome = if log == Path::new("-") {
        feed_reader(std::io::stdin().lock(), &mut correlator)?
    } else {
        let file = std::fs::File::open(log)
            .with_context(|| format!("failed to open log {}", log.display()))?;
        feed_reader(BufReader::new(file), &mut correlator)?
    };

    finish_run(correlator, &outcome, &config, &workdir, args.format.into())
}

/// @ai:intent Shape annotations, publish them and print the summary
/// @ai:effects fs:read, io
fn finish_run(
    correlator: Correlator,
    outcome: &CompileOutcome,
    config: &Config,
    workdir: &Path,
    format: OutputFormat,
) -> Result<ExitCode> {
    let store = correlator.finish();

    let annotations = match shape_annotations(&store, workdir, count_lines) {
        Ok(annotations) => annotations,
        Err(e) => {
            tracing::warn!(error = %e, "could not determine file lengths, skipping annotations");
            Vec::new()
        }
    };

    if config.annotate_enabled() {
        for payload in &annotations {
            println!("{}", format_workflow_command(payload));
        }
    }

    let summary = RunSummary::new(&store, outcome, config.fail_on_mask()?, workdir);
    let passed = summary.passed;
    let report = Report {
        summary,
        annotations,
    };
    println!("{}", format_report(&report, format));

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// @ai:intent Write a default configuration file
/// @ai:effects fs:write
fn init_config(output: &Path) -> Result<ExitCode> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(output, content)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!("Wrote default configuration to {}", output.display());
    Ok(ExitCode::SUCCESS)
}
