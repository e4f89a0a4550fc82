//! CLI binary for sagip-worksheet.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `WorksheetConfig`, prints the analysis and saves the worksheet PDF.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sagip_worksheet::{
    analyze_image, save_worksheet, AnalysisOutput, FooterStyle, Language, StructuredResult,
    WorksheetConfig,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const ANALYZE_FAILED: &str = "Failed to analyze the image. Please try again.";
const RENDER_FAILED: &str = "Could not generate the PDF. Please try again.";

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyse a quiz photo, print the review and save a Taglish worksheet
  sagip quiz.jpg

  # Tagalog worksheet with 8 problems into ./worksheets
  sagip quiz.jpg --language tagalog --problems 8 --output-dir worksheets

  # Keep the analysis so the PDF can be re-rendered later for free
  sagip quiz.jpg --save-json quiz.json
  sagip quiz.json --render-only --language cebuano

  # Analysis only, as JSON
  sagip https://example.com/quiz.png --no-pdf --json > analysis.json

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (default model gemini-2.5-flash)
  OPENAI_API_KEY          OpenAI API key (default model gpt-4.1-mini)
  EDGEQUAKE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  SAGIP_*                 Any flag, e.g. SAGIP_LANGUAGE=tagalog
"#;

/// Turn a photo of a graded quiz into a printable remediation worksheet.
#[derive(Parser, Debug)]
#[command(
    name = "sagip",
    version,
    about = "Turn a photo of a graded quiz into a printable remediation worksheet",
    long_about = "Sends a photo of a graded quiz to a vision LLM, which finds the mistakes \
and writes a short concept review, new practice problems and an answer key. The result is \
laid out as an A4 PDF worksheet ready for printing.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Quiz photo: local path, HTTP/HTTPS URL or data URL.
    /// With --render-only, a JSON file saved by --save-json.
    input: String,

    /// Worksheet language.
    #[arg(short, long, env = "SAGIP_LANGUAGE", value_enum, default_value = "taglish")]
    language: LanguageArg,

    /// Directory to save the worksheet PDF into.
    #[arg(short, long, env = "SAGIP_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// LLM model ID (e.g. gemini-2.5-flash, gpt-4.1-mini).
    #[arg(long, env = "SAGIP_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama.
    #[arg(
        long,
        env = "SAGIP_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: gemini, openai, anthropic, azure, ollama."
    )]
    provider: Option<String>,

    /// Number of practice problems (1–20).
    #[arg(long, env = "SAGIP_PROBLEMS", default_value_t = 5,
          value_parser = clap::value_parser!(u32).range(1..=20))]
    problems: u32,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "SAGIP_TEMPERATURE", default_value_t = 0.4)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "SAGIP_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Downscale photos whose longest edge exceeds this many pixels.
    #[arg(long, env = "SAGIP_MAX_IMAGE_DIMENSION", default_value_t = 2048,
          value_parser = clap::value_parser!(u32).range(256..=8192))]
    max_image_dimension: u32,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "SAGIP_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Print this line in every page footer instead of page numbers.
    #[arg(long, env = "SAGIP_FOOTER_TAGLINE")]
    footer_tagline: Option<String>,

    /// Also write the analysis result as JSON to this file.
    #[arg(long, env = "SAGIP_SAVE_JSON")]
    save_json: Option<PathBuf>,

    /// Treat INPUT as a saved JSON result and only render the PDF.
    #[arg(long, env = "SAGIP_RENDER_ONLY", conflicts_with = "no_pdf")]
    render_only: bool,

    /// Skip PDF generation.
    #[arg(long, env = "SAGIP_NO_PDF")]
    no_pdf: bool,

    /// Print the analysis as JSON (AnalysisOutput) instead of text.
    #[arg(long, env = "SAGIP_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "SAGIP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SAGIP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SAGIP_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "SAGIP_DOWNLOAD_TIMEOUT", default_value_t = 60)]
    download_timeout: u64,

    /// LLM call timeout in seconds.
    #[arg(long, env = "SAGIP_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LanguageArg {
    English,
    Tagalog,
    Cebuano,
    Taglish,
}

impl From<LanguageArg> for Language {
    fn from(v: LanguageArg) -> Self {
        match v {
            LanguageArg::English => Language::English,
            LanguageArg::Tagalog => Language::Tagalog,
            LanguageArg::Cebuano => Language::Cebuano,
            LanguageArg::Taglish => Language::Taglish,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs would tear through the spinner line, so they are muted
    // while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.render_only;
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

    let config = build_config(&cli).await?;
    let language = Language::from(cli.language);

    // ── Analysis (or reload) ─────────────────────────────────────────────
    let result = if cli.render_only {
        load_result(&cli.input).await?
    } else {
        let progress = show_progress.then(|| spinner(&format!("Analysing quiz photo ({language})…")));

        let outcome = analyze_image(&cli.input, language, &config).await;
        if let Some(ref bar) = progress {
            bar.finish_and_clear();
        }
        let output = outcome.context(ANALYZE_FAILED)?;

        report_analysis(&cli, &output)?;
        output.result
    };

    if let Some(ref path) = cli.save_json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !cli.quiet {
            eprintln!("{} analysis saved to {}", green("✔"), bold(&path.display().to_string()));
        }
    }

    // ── Worksheet ────────────────────────────────────────────────────────
    if cli.no_pdf {
        return Ok(());
    }

    let path = save_worksheet(&result, language, &config)
        .await
        .context(RENDER_FAILED)?;

    if cli.json {
        // stdout carries JSON; keep the path on stderr.
        eprintln!("{}", path.display());
    } else if !cli.quiet {
        eprintln!("{} worksheet saved to {}", green("✔"), bold(&path.display().to_string()));
    }

    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Read a result written by `--save-json`. A full `--json` dump is accepted
/// too.
async fn load_result(path: &str) -> Result<StructuredResult> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {path}"))?;

    if let Ok(result) = serde_json::from_str::<StructuredResult>(&text) {
        return Ok(result);
    }
    let output: AnalysisOutput = serde_json::from_str(&text)
        .with_context(|| format!("{path} is not a saved worksheet result"))?;
    Ok(output.result)
}

fn report_analysis(cli: &Cli, output: &AnalysisOutput) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    let r = &output.result;
    println!("{}", bold(&cyan("Guro's Notes (Concept Review)")));
    println!("{}\n", r.concept_review.trim());

    println!("{}", bold(&cyan("Remediation Exercises")));
    for (i, problem) in r.practice_problems.iter().enumerate() {
        println!("{:>3}. {}", i + 1, problem.trim());
    }

    if r.has_answer_key() {
        println!("\n{}", bold(&cyan("Answer Key")));
        for (i, answer) in r.answer_key.iter().enumerate() {
            println!("{:>3}. {}", i + 1, answer.trim());
        }
    }

    eprintln!(
        "\n   {} tokens in  /  {} tokens out,  {}ms",
        dim(&output.stats.input_tokens.to_string()),
        dim(&output.stats.output_tokens.to_string()),
        output.stats.duration_ms,
    );
    Ok(())
}

/// Map CLI args to `WorksheetConfig`.
async fn build_config(cli: &Cli) -> Result<WorksheetConfig> {
    let mut builder = WorksheetConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .problem_count(cli.problems as usize)
        .max_image_dimension(cli.max_image_dimension)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout)
        .output_dir(cli.output_dir.clone());

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(ref tagline) = cli.footer_tagline {
        builder = builder.footer(FooterStyle::Tagline(tagline.clone()));
    }

    builder.build().context("Invalid configuration")
}
