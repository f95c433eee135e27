use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codeprep_core::{CodeprepConfig, Language, Problem, RunReport, TestOutcome, Verdict};
use codeprep_engine::{
    extract_function_name, load_catalog, load_problem, synthesizer_for, PracticeRunner,
    ReferenceExecutor, RunEvent,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codeprep")]
#[command(about = "codeprep - run practice solutions against problem test cases", long_about = None)]
struct Cli {
    /// Config file (JSON); environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List problems in a directory
    Problems {
        /// Directory of problem JSON files
        #[arg(default_value = "problems")]
        dir: PathBuf,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Run a solution against the visible test cases
    Run {
        /// Problem JSON file
        problem: PathBuf,

        /// Solution source file
        solution: PathBuf,

        /// Solution language (javascript, cpp, java); defaults from the file extension
        #[arg(short, long)]
        language: Option<Language>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Submit a solution against every test case
    Submit {
        /// Problem JSON file
        problem: PathBuf,

        /// Solution source file
        solution: PathBuf,

        /// Solution language (javascript, cpp, java); defaults from the file extension
        #[arg(short, long)]
        language: Option<Language>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Print the program generated for one test case
    Harness {
        /// Problem JSON file
        problem: PathBuf,

        /// Solution source file
        solution: PathBuf,

        /// Solution language (javascript, cpp, java); defaults from the file extension
        #[arg(short, long)]
        language: Option<Language>,

        /// Test case number, starting at 1
        #[arg(long, default_value = "1")]
        case: usize,
    },

    /// Show the resolved configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Problems { dir, output } => cmd_problems(&dir, &output)?,
        Commands::Run {
            problem,
            solution,
            language,
            output,
        } => cmd_run(&config, &problem, &solution, language, &output).await?,
        Commands::Submit {
            problem,
            solution,
            language,
            output,
        } => cmd_submit(&config, &problem, &solution, language, &output).await?,
        Commands::Harness {
            problem,
            solution,
            language,
            case,
        } => cmd_harness(&problem, &solution, language, case)?,
        Commands::Status => cmd_status(&config),
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CodeprepConfig> {
    let config = match path {
        Some(path) => CodeprepConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CodeprepConfig::default(),
    };
    let config = config.with_env();
    config.validate()?;
    Ok(config)
}

fn resolve_language(solution: &Path, language: Option<Language>) -> Result<Language> {
    if let Some(language) = language {
        return Ok(language);
    }
    let ext = solution
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    Language::all()
        .iter()
        .copied()
        .find(|l| l.file_extension() == ext)
        .with_context(|| {
            format!(
                "cannot tell the language of {}; pass --language",
                solution.display()
            )
        })
}

fn read_inputs(problem: &Path, solution: &Path) -> Result<(Problem, String)> {
    let problem = load_problem(problem)
        .with_context(|| format!("loading problem {}", problem.display()))?;
    let source = std::fs::read_to_string(solution)
        .with_context(|| format!("reading solution {}", solution.display()))?;
    Ok((problem, source))
}

/// Cancels the token on Ctrl-C. The case in flight finishes; nothing after it starts.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current case");
            token.cancel();
        }
    });
    cancel
}

/// Prints a line per finished case while the runner works.
fn progress_printer() -> (mpsc::Sender<RunEvent>, tokio::task::JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(32);
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                RunEvent::Started { total, .. } => println!("  Running {} case(s)...", total),
                RunEvent::CaseFinished { outcome } => print_outcome(&outcome),
                RunEvent::Cancelled => println!("  Cancelled."),
                _ => {}
            }
        }
    });
    (tx, handle)
}

fn build_runner(
    config: &CodeprepConfig,
    output: &str,
) -> Result<(PracticeRunner, Option<tokio::task::JoinHandle<()>>)> {
    let runner = PracticeRunner::from_config(config)?;
    match output {
        "json" => Ok((runner, None)),
        _ => {
            let (tx, handle) = progress_printer();
            Ok((runner.with_events(tx), Some(handle)))
        }
    }
}

async fn cmd_run(
    config: &CodeprepConfig,
    problem: &Path,
    solution: &Path,
    language: Option<Language>,
    output: &str,
) -> Result<()> {
    let language = resolve_language(solution, language)?;
    let (problem, source) = read_inputs(problem, solution)?;
    let (runner, printer) = build_runner(config, output)?;

    if output != "json" {
        println!();
        println!("Running {} ({})", problem.title, language.label());
    }

    let report = runner
        .run(&problem, &source, language, &cancel_on_ctrl_c())
        .await?;
    drop(runner);
    if let Some(printer) = printer {
        printer.await?;
    }

    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => {
            print_summary(&report);
            println!();
        }
    }

    Ok(())
}

async fn cmd_submit(
    config: &CodeprepConfig,
    problem: &Path,
    solution: &Path,
    language: Option<Language>,
    output: &str,
) -> Result<()> {
    let language = resolve_language(solution, language)?;
    let (problem, source) = read_inputs(problem, solution)?;
    let (runner, printer) = build_runner(config, output)?;

    if output != "json" {
        println!();
        println!("Submitting {} ({})", problem.title, language.label());
    }

    let outcome = runner
        .submit(&problem, &source, language, &cancel_on_ctrl_c())
        .await?;
    drop(runner);
    if let Some(printer) = printer {
        printer.await?;
    }

    if output == "json" {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_summary(&outcome.report);
    match &outcome.verdict {
        Verdict::AllPassed => println!("  Accepted."),
        Verdict::Cancelled => println!("  Submission cancelled."),
        Verdict::Failed(detail) => {
            let which = match detail.hidden_case_failure {
                true => "hidden case",
                false => "case",
            };
            println!("  Failed on {} #{}", which, detail.case_index);
            println!("    Input:    {}", detail.input);
            println!("    Expected: {}", detail.expected);
            if let Some(actual) = &detail.actual {
                println!("    Actual:   {}", actual);
            }
            if let Some(message) = &detail.message {
                println!("    {}", message);
            }
        }
    }
    println!();

    Ok(())
}

fn cmd_harness(
    problem: &Path,
    solution: &Path,
    language: Option<Language>,
    case: usize,
) -> Result<()> {
    let language = resolve_language(solution, language)?;
    let (problem, source) = read_inputs(problem, solution)?;
    let function_name = extract_function_name(&problem.starter)
        .context("starter code declares no function")?;
    let test_case = case
        .checked_sub(1)
        .and_then(|idx| problem.test_cases.get(idx))
        .with_context(|| {
            format!(
                "case {} out of range (1-{})",
                case,
                problem.test_cases.len()
            )
        })?;

    let program = match synthesizer_for(language) {
        Some(synthesizer) => synthesizer.synthesize(&source, &function_name, test_case),
        None => ReferenceExecutor::wrap(&source, &function_name, test_case),
    };
    print!("{}", program);

    Ok(())
}

#[derive(Serialize)]
struct ProblemRow<'a> {
    id: &'a str,
    title: &'a str,
    difficulty: &'static str,
    cases: usize,
    visible: usize,
}

fn cmd_problems(dir: &Path, output: &str) -> Result<()> {
    let problems = load_catalog(dir)
        .with_context(|| format!("loading problems from {}", dir.display()))?;

    let rows: Vec<ProblemRow> = problems
        .iter()
        .map(|p| ProblemRow {
            id: &p.id,
            title: &p.title,
            difficulty: p.difficulty.label(),
            cases: p.test_cases.len(),
            visible: p.visible().len(),
        })
        .collect();

    if output == "json" {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!();
    println!("Problems:");
    println!("{:-<70}", "");
    println!("  {:<24} {:<28} {:<8} {}", "ID", "Title", "Level", "Cases");
    println!("{:-<70}", "");
    for row in &rows {
        println!(
            "  {:<24} {:<28} {:<8} {} ({} visible)",
            row.id, row.title, row.difficulty, row.cases, row.visible
        );
    }
    println!();

    Ok(())
}

fn cmd_status(config: &CodeprepConfig) {
    println!("Configuration:");
    println!("{:-<40}", "");
    println!("  Primary sandbox:   {}", config.execution.primary.url);
    match &config.execution.secondary {
        Some(secondary) => println!("  Secondary sandbox: {}", secondary.url),
        None => println!("  Secondary sandbox: (none)"),
    }
    println!("  Timeout:           {}s", config.execution.timeout_secs);
    println!(
        "  API key:           {}",
        match config.execution.primary.api_key {
            Some(_) => "set",
            None => "unset",
        }
    );
    println!("  JavaScript:        {}", config.reference.command);
}

fn print_outcome(outcome: &TestOutcome) {
    let label = match outcome.hidden {
        true => "hidden",
        false => "case",
    };
    let mark = match outcome.passed {
        true => "PASS",
        false => "FAIL",
    };
    println!("  [{}] {} #{}", mark, label, outcome.case_index);
    if outcome.passed || outcome.hidden {
        return;
    }
    println!("      Input:    {}", outcome.input);
    println!("      Expected: {}", outcome.expected);
    if let Some(actual) = &outcome.actual {
        println!("      Actual:   {}", actual);
    }
    if let Some(message) = outcome.message() {
        println!("      {}", message);
    }
}

fn print_summary(report: &RunReport) {
    println!("{:-<40}", "");
    println!("  Passed: {}/{}", report.passed, report.total);
    if report.cancelled {
        println!("  (stopped early)");
    }
}
