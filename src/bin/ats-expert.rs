//! CLI binary for ats-resume-expert.
//!
//! A thin presentation layer over the library: maps flags to
//! `AssessmentConfig`, shows a spinner while the model works, and prints the
//! result. The API key enters the process here and nowhere else.

use anyhow::{Context, Result};
use ats_resume_expert::{
    assess, inspect, Action, Assessment, AssessmentConfig, AssessmentOutput, AtsError,
    DEFAULT_MAX_PAGES,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Narrative review against a pasted job description
  ats-expert resume.pdf --job "Senior Data Engineer, Spark, Airflow"

  # Skill-gap roadmap, job description from a file
  ats-expert resume.pdf --action skills --job-file jd.txt

  # Match percentage, job description from stdin, JSON output
  pbpaste | ats-expert resume.pdf --action match --job-file - --json

  # Read every page instead of the first 5
  ats-expert --all-pages long_cv.pdf --action match --job-file jd.txt

  # Use another provider through edgequake-llm
  ats-expert resume.pdf --provider openai --model gpt-4.1-mini --job-file jd.txt

  # Page count and metadata only (no API key needed)
  ats-expert --inspect-only resume.pdf

ENVIRONMENT VARIABLES:
  GOOGLE_API_KEY          Gemini API key (also read from a .env file)
  OPENAI_API_KEY          Used with --provider openai
  ANTHROPIC_API_KEY       Used with --provider anthropic
  PDFIUM_LIB_PATH         Directory or file of the pdfium shared library
  RUST_LOG                Override log filtering (e.g. ats_resume_expert=debug)
"#;

/// ATS-style resume review, skill-gap plan and match score.
#[derive(Parser, Debug)]
#[command(
    name = "ats-expert",
    version,
    about = "ATS-style resume review, skill-gap plan and match score (Gemini powered)",
    long_about = "Upload a resume (PDF) and a job description to get an ATS-style review, \
skill improvement suggestions, or a match percentage from a generative language model.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Resume PDF: local file path or HTTP/HTTPS URL.
    resume: Option<String>,

    /// What to produce: analyze, skills, match.
    #[arg(short, long, env = "ATS_EXPERT_ACTION", value_enum, default_value = "analyze")]
    action: ActionArg,

    /// Job description text.
    #[arg(short, long, env = "ATS_EXPERT_JOB", conflicts_with = "job_file")]
    job: Option<String>,

    /// Read the job description from a file ("-" for stdin).
    #[arg(long, env = "ATS_EXPERT_JOB_FILE")]
    job_file: Option<PathBuf>,

    /// Pages of the resume to read.
    #[arg(long, env = "ATS_EXPERT_MAX_PAGES", default_value_t = DEFAULT_MAX_PAGES,
          value_parser = clap::value_parser!(usize))]
    max_pages: usize,

    /// Read every page of the resume.
    #[arg(long, env = "ATS_EXPERT_ALL_PAGES")]
    all_pages: bool,

    /// Model ID (default: gemini-2.5-pro).
    #[arg(long, env = "ATS_EXPERT_MODEL")]
    model: Option<String>,

    /// Provider: gemini (default), openai, anthropic, ollama, ...
    #[arg(long, env = "ATS_EXPERT_PROVIDER")]
    provider: Option<String>,

    /// Gemini API key.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the Gemini API root URL.
    #[arg(long, env = "ATS_EXPERT_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Sampling temperature (0.0–2.0). Service default if unset.
    #[arg(long, env = "ATS_EXPERT_TEMPERATURE")]
    temperature: Option<f32>,

    /// Max output tokens. Service default if unset.
    #[arg(long, env = "ATS_EXPERT_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Model call timeout in seconds. Waits indefinitely if unset.
    #[arg(long, env = "ATS_EXPERT_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// PDF user password for encrypted resumes.
    #[arg(long, env = "ATS_EXPERT_PASSWORD")]
    password: Option<String>,

    /// Directory (or file) of the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// HTTP download timeout in seconds for URL resumes.
    #[arg(long, env = "ATS_EXPERT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Output structured JSON (AssessmentOutput) instead of text.
    #[arg(long, env = "ATS_EXPERT_JSON")]
    json: bool,

    /// Print resume page count and metadata only, no assessment.
    #[arg(long)]
    inspect_only: bool,

    /// Disable the spinner.
    #[arg(long, env = "ATS_EXPERT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ATS_EXPERT_VERBOSE")]
    verbose: bool,

    /// Suppress everything except the result and errors.
    #[arg(short, long, env = "ATS_EXPERT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ActionArg {
    Analyze,
    Skills,
    Match,
}

impl From<ActionArg> for Action {
    fn from(v: ActionArg) -> Self {
        match v {
            ActionArg::Analyze => Action::Analyze,
            ActionArg::Skills => Action::SkillGap,
            ActionArg::Match => Action::Match,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap so env-backed flags (GOOGLE_API_KEY, ...) see it.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback that matters; keep INFO logs quiet
    // while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let action: Action = cli.action.into();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = match inspect(cli.resume.as_deref(), &config).await {
            Ok(info) => info,
            Err(e) => fail(&e, "inspection"),
        };

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:       {}", info.name);
            println!("Pages:      {}", info.page_count);
            if let Some(ref t) = info.title {
                println!("Title:      {}", t);
            }
            if let Some(ref a) = info.author {
                println!("Author:     {}", a);
            }
            if let Some(ref c) = info.creator {
                println!("Creator:    {}", c);
            }
            if let Some(ref p) = info.producer {
                println!("Producer:   {}", p);
            }
        }
        return Ok(());
    }

    // The resume comes first: without it the job text is never read.
    let resume = match resume_arg(&cli) {
        Ok(resume) => resume,
        Err(e) => fail(&e, action.failure_context()),
    };
    let job_text = read_job_text(&cli).await?;

    // ── Run ──────────────────────────────────────────────────────────────
    let spinner = show_progress.then(|| start_spinner(action.progress_message()));
    let result = assess(Some(resume), &job_text, action, &config).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let output = match result {
        Ok(output) => output,
        Err(e) => fail(&e, action.failure_context()),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    print_assessment(&output, cli.quiet);
    Ok(())
}

/// Print a failure the way the user should see it, then exit.
fn fail(err: &AtsError, context: &str) -> ! {
    if err.is_missing_input() {
        eprintln!("{}", red("Please upload your resume PDF first."));
    } else {
        eprintln!("{}", red(&format!("Error during {context}: {err}")));
    }
    std::process::exit(1);
}

fn start_spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_assessment(output: &AssessmentOutput, quiet: bool) {
    let assessment = &output.assessment;
    println!("{}\n", bold(assessment.action().title()));

    if let Assessment::Match(ref m) = assessment {
        match m.score {
            Some(pct) => {
                println!("ATS Match: {}", bold(&format!("{pct}%")));
                println!("{}", green(&score_bar(pct, 40)));
            }
            None => println!(
                "{}",
                yellow(
                    "Couldn't reliably parse the percentage from the model's first line. \
Please check the raw response below."
                )
            ),
        }
        println!("\n{}\n", dim(&"─".repeat(40)));
    }

    println!("{}", assessment.response().trim_end());

    if !quiet {
        let s = &output.stats;
        eprintln!(
            "\n{}",
            dim(&format!(
                "{}/{} pages read  ·  {} chars  ·  {} tokens in / {} out  ·  {}ms",
                s.pages_with_text,
                s.total_pages,
                s.resume_chars,
                s.prompt_tokens,
                s.completion_tokens,
                s.total_duration_ms
            ))
        );
    }
}

/// Horizontal bar for a 0–100 score.
fn score_bar(pct: u8, width: usize) -> String {
    let filled = (usize::from(pct.min(100)) * width + 50) / 100;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

/// The resume argument, or `MissingInput` when absent or blank.
fn resume_arg(cli: &Cli) -> std::result::Result<&str, AtsError> {
    match cli.resume.as_deref() {
        Some(r) if !r.trim().is_empty() => Ok(r),
        _ => Err(AtsError::MissingInput),
    }
}

/// Job description from `--job`, `--job-file` or stdin (`-`). Empty is fine.
async fn read_job_text(cli: &Cli) -> Result<String> {
    if let Some(ref text) = cli.job {
        return Ok(text.clone());
    }
    match cli.job_file {
        Some(ref path) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read job description from stdin")?;
            Ok(buf)
        }
        Some(ref path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read job description from {:?}", path)),
        None => Ok(String::new()),
    }
}

/// Map CLI args to `AssessmentConfig`.
fn build_config(cli: &Cli) -> Result<AssessmentConfig> {
    let mut builder = AssessmentConfig::builder()
        .max_pages(cli.max_pages)
        .download_timeout_secs(cli.download_timeout);

    if cli.all_pages {
        builder = builder.all_pages();
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref url) = cli.api_base_url {
        builder = builder.api_base_url(url);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(lib);
    }

    builder.build().context("Invalid configuration")
}
