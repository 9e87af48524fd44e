//! MRUP oracle CLI.
//!
//! Compares captured window-function results for one case or a whole corpus,
//! and checks window clauses against the MRUP soundness constraints.

use clap::{Parser, Subcommand, ValueEnum};
use mrup_oracle::conformance::{CorpusRunner, MrupCase, ReproBundle, TestResult};
use mrup_oracle::window::{verify_constraints, Constraint};
use mrup_oracle::{CompareOptions, ErrorCode, MrupComparator, NullsPlacement, OrderSpec, Schema};
use serde_json::json;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mrup-oracle")]
#[command(about = "MRUP comparator for SQL window-function results")]
#[command(version)]
struct Cli {
    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Log verbosity
    #[arg(long, value_enum, default_value_t = Verbosity::Warn, global = true)]
    verbosity: Verbosity,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Verbosity {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
enum WfNulls {
    First,
    Last,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the three results of one case file
    Compare {
        /// Path to the case JSON
        case: PathBuf,

        /// Sample rows per side in each partition diff
        #[arg(long)]
        max_samples: Option<usize>,

        /// NULL placement of the wf_result tiebreak
        #[arg(long, value_enum)]
        wf_nulls: Option<WfNulls>,

        /// Write a repro bundle here when the verdict is not PASS (.json for JSON)
        #[arg(long)]
        repro: Option<PathBuf>,
    },

    /// Run every case of a corpus file
    Corpus {
        /// Path to the corpus JSON
        corpus: PathBuf,
    },

    /// Check a window clause against the soundness constraints
    CheckWindow {
        /// Window clause, e.g. "OVER (PARTITION BY dept ORDER BY salary)"
        clause: String,

        /// Window function, e.g. SUM or ROW_NUMBER
        #[arg(long)]
        function: Option<String>,

        /// Comma-separated column names: partition column first, wf_result last.
        /// ORDER BY may only use the columns in between.
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
    },

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbosity, cli.log_format);

    let result = match cli.command {
        Commands::Compare {
            case,
            max_samples,
            wf_nulls,
            repro,
        } => run_compare(case, max_samples, wf_nulls, repro),
        Commands::Corpus { corpus } => run_corpus(corpus),
        Commands::CheckWindow {
            clause,
            function,
            columns,
        } => run_check_window(&clause, function.as_deref(), columns),
        Commands::Version => {
            println!("mrup-oracle v{}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    };

    result.unwrap_or_else(|e| {
        println!(
            "{}",
            json!({"error": {"code": e.code(), "message": e.to_string()}})
        );
        ExitCode::from(2)
    })
}

fn setup_logging(verbosity: Verbosity, format: LogFormat) {
    let level = match verbosity {
        Verbosity::Error => Level::ERROR,
        Verbosity::Warn => Level::WARN,
        Verbosity::Info => Level::INFO,
        Verbosity::Debug => Level::DEBUG,
        Verbosity::Trace => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }
}

fn run_compare(
    path: PathBuf,
    max_samples: Option<usize>,
    wf_nulls: Option<WfNulls>,
    repro: Option<PathBuf>,
) -> Result<ExitCode, ErrorCode> {
    let case = MrupCase::load(&path)?;
    info!(case = %case.id, path = %path.display(), "loaded case");

    let mut options = CompareOptions::standard();
    if let Some(rows) = max_samples {
        options = options.with_max_sample_rows(rows);
    }
    if let Some(nulls) = wf_nulls {
        options = options.with_wf_result_nulls(match nulls {
            WfNulls::First => NullsPlacement::First,
            WfNulls::Last => NullsPlacement::Last,
        });
    }

    let inputs = case.inputs()?;
    let outcome =
        MrupComparator::new(options).check(&inputs.t1, &inputs.t2, &inputs.union, &inputs.spec)?;
    println!("{}", to_pretty_json(&outcome)?);

    if outcome.is_pass() {
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(repro_path) = repro {
        let schema = case.schema()?;
        let bundle = ReproBundle::new(
            case.id.clone(),
            case.window_clause(&schema),
            case.function.clone(),
            case.queries.clone(),
            case.expect,
            outcome,
        );
        bundle.save(&repro_path)?;
        info!(path = %repro_path.display(), "repro bundle written");
    }
    Ok(ExitCode::from(1))
}

fn run_corpus(path: PathBuf) -> Result<ExitCode, ErrorCode> {
    let runner = CorpusRunner::load(&path).map_err(|e| match e.code() {
        101 => ErrorCode::E101_Io(e.to_string()),
        _ => ErrorCode::E100_InvalidCase(e.to_string()),
    })?;
    let results = runner.run_all();

    println!("{}", results.summary());
    for case in &results.details {
        match &case.result {
            TestResult::Pass => {}
            TestResult::Fail {
                expected, actual, ..
            } => println!("FAIL {}: expected {}, got {}", case.id, expected, actual),
            TestResult::Inconclusive { message } => {
                println!("INCONCLUSIVE {}: {}", case.id, message)
            }
        }
    }

    Ok(if results.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn run_check_window(
    clause: &str,
    function: Option<&str>,
    columns: Option<Vec<String>>,
) -> Result<ExitCode, ErrorCode> {
    let schema = columns.map(Schema::new).transpose()?;
    let orderable = schema.as_ref().map(Schema::orderable_columns);
    let checks = verify_constraints(function.unwrap_or_default(), clause, orderable)?;
    // Without a function only the window shape can be judged.
    let checks: Vec<_> = checks
        .into_iter()
        .filter(|c| {
            function.is_some()
                || !matches!(
                    c.constraint,
                    Constraint::RankingWithoutFrame | Constraint::Deterministic
                )
        })
        .collect();

    let order_by = match &schema {
        Some(schema) => Some(OrderSpec::from_window_clause(clause, schema)?.to_sql(schema)),
        None => None,
    };

    let all_passed = checks.iter().all(|c| c.passed);
    let report = json!({
        "checks": checks
            .iter()
            .map(|c| json!({
                "id": c.constraint.id(),
                "description": c.constraint.description(),
                "passed": c.passed,
            }))
            .collect::<Vec<_>>(),
        "order_by": order_by,
        "sound": all_passed,
    });
    println!("{}", to_pretty_json(&report)?);

    Ok(if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, ErrorCode> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ErrorCode::E101_Io(format!("cannot encode output: {}", e)))
}
