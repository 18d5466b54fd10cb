//! CLI binary for semester-assistant.
//!
//! A thin shim over the library crate: flags map to `AssistantConfig`, the
//! sidebar toggles become `--ask/--quiz/--assignment`, and download buttons
//! become `--export-dir`. Without a query or toggle on the command line it
//! drops into an interactive prompt loop.

use anyhow::{Context, Result};
use clap::Parser;
use semester_assistant::{
    check_preconditions, resolve_input, AssistantConfig, AssistantError, EncodingPolicy,
    ExportArtifact, ExportConfig, ExportFormat, GeminiClient, Guidance, InteractionRecord,
    OperationKind, OperationSet, PaperSize, ProgressCallback, Session, SessionProgressCallback,
    Submission, SubmissionOutcome,
};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Terminal busy indicator: one spinner per action, cleared by [`finish`].
///
/// [`finish`]: CliProgressCallback::finish
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
            started: Mutex::new(None),
        })
    }

    /// Show `msg` on the spinner, creating it if no action is running.
    fn spin(&self, prefix: &str, msg: String) {
        let Ok(mut slot) = self.bar.lock() else { return };
        let bar = slot.get_or_insert_with(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(TICKS),
            );
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        bar.set_prefix(prefix.to_string());
        bar.set_message(msg);
    }

    fn println(&self, line: String) {
        match self.bar.lock().ok().and_then(|slot| slot.clone()) {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    /// Clear the spinner at the end of an action.
    fn finish(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }

    fn elapsed(&self) -> String {
        let secs = self
            .started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        dim(&format!("{secs:.1}s"))
    }

    fn mark_start(&self) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
    }
}

impl SessionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, document_name: &str) {
        self.mark_start();
        self.spin("Extracting", format!("text from {document_name}…"));
    }

    fn on_extraction_complete(&self, page_count: usize, outline_len: usize) {
        self.println(format!(
            "  {} Outline processed  {}  {}",
            green("✓"),
            dim(&format!("{page_count} pages, {outline_len} chars")),
            self.elapsed()
        ));
        self.finish();
    }

    fn on_operation_start(&self, kind: OperationKind, index: usize, total: usize) {
        self.mark_start();
        self.spin(
            "Gemini",
            format!("{kind} ({index}/{total})  getting response…"),
        );
    }

    fn on_operation_complete(&self, kind: OperationKind, response_len: usize) {
        self.println(format!(
            "  {} {:<20}  {}  {}",
            green("✓"),
            kind.to_string(),
            dim(&format!("{response_len:>5} chars")),
            self.elapsed()
        ));
    }

    fn on_operation_error(&self, kind: OperationKind, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(std::iter::once('…')).collect()
        } else {
            error.to_string()
        };
        self.println(format!(
            "  {} {:<20}  {}  {}",
            red("✗"),
            kind.to_string(),
            red(&msg),
            self.elapsed()
        ));
        self.finish();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive session (type a question, /quiz to toggle quiz generation)
  semester outline.pdf

  # Generate a quiz and save quiz.pdf + quiz.txt
  semester outline.pdf --quiz --export-dir ./out --export-format both

  # Ask one question
  semester outline.pdf --ask --query "When is the midterm?"

  # Everything at once, as JSON
  semester https://uni.example/cs101/outline.pdf --ask --assignment --quiz \
      --query "Focus on graphs" --json

INTERACTIVE COMMANDS:
  <text>                 Submit <text> as the query with the current toggles
  /ask /quiz /assignment Toggle an action on or off
  /history               Reprint the conversation, newest first
  /export <n> [pdf|txt]  Write record n (1 = newest) to the export directory
  /help                  Show this list
  /quit                  Leave

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY         Google Gemini API key
  SEMESTER_INPUT         Default outline path or URL
  SEMESTER_MODEL         Override model ID (default gemini-1.5-flash)
  RUST_LOG               Override log filter (e.g. semester_assistant=debug)
"#;

const REPL_HELP: &str = "\
  <text>                 submit <text> as the query with the current toggles
  /ask /quiz /assignment toggle an action on or off
  /history               reprint the conversation, newest first
  /export <n> [pdf|txt]  write record n (1 = newest)
  /help                  show this list
  /quit                  leave";

/// Ask questions about a semester outline and generate quizzes and assignments.
#[derive(Parser, Debug)]
#[command(
    name = "semester",
    version,
    about = "Ask questions about a PDF semester outline and generate quizzes and assignments with Gemini",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL of the semester outline.
    #[arg(env = "SEMESTER_INPUT")]
    input: Option<String>,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model ID.
    #[arg(long, env = "SEMESTER_MODEL", default_value = "gemini-1.5-flash")]
    model: String,

    /// Base URL of the Gemini REST API.
    #[arg(long, env = "SEMESTER_BASE_URL")]
    base_url: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "SEMESTER_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Max output tokens per response.
    #[arg(long, env = "SEMESTER_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: u32,

    /// Answer the query about the outline.
    #[arg(long)]
    ask: bool,

    /// Generate a 5-question multiple-choice quiz.
    #[arg(long)]
    quiz: bool,

    /// Generate an assignment brief.
    #[arg(long)]
    assignment: bool,

    /// Query text used by --ask and in history labels.
    #[arg(long)]
    query: Option<String>,

    /// Write quiz and assignment exports to this directory.
    #[arg(long, env = "SEMESTER_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Export format.
    #[arg(long, value_enum, default_value = "pdf")]
    export_format: ExportFormatArg,

    /// What to do with characters the PDF font cannot encode.
    #[arg(long, value_enum, default_value = "transliterate")]
    encoding: EncodingArg,

    /// PDF paper size.
    #[arg(long, value_enum, default_value = "a4")]
    paper: PaperArg,

    /// Print new records as JSON instead of the chat history.
    #[arg(long)]
    json: bool,

    /// Start the interactive prompt loop (default when no action is given).
    #[arg(short, long)]
    interactive: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SEMESTER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, env = "SEMESTER_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "SEMESTER_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ExportFormatArg {
    Pdf,
    Txt,
    Both,
}

impl ExportFormatArg {
    fn formats(self) -> &'static [ExportFormat] {
        match self {
            ExportFormatArg::Pdf => &[ExportFormat::Pdf],
            ExportFormatArg::Txt => &[ExportFormat::Text],
            ExportFormatArg::Both => &[ExportFormat::Pdf, ExportFormat::Text],
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EncodingArg {
    Strict,
    Transliterate,
    Replace,
}

impl From<EncodingArg> for EncodingPolicy {
    fn from(v: EncodingArg) -> Self {
        match v {
            EncodingArg::Strict => EncodingPolicy::Strict,
            EncodingArg::Transliterate => EncodingPolicy::Transliterate,
            EncodingArg::Replace => EncodingPolicy::Replace,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PaperArg {
    A4,
    Letter,
}

impl From<PaperArg> for PaperSize {
    fn from(v: PaperArg) -> Self {
        match v {
            PaperArg::A4 => PaperSize::A4,
            PaperArg::Letter => PaperSize::Letter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the spinner is active; the
    // spinner provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.json;
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

    let operations = OperationSet {
        ask: cli.ask,
        quiz: cli.quiz,
        assignment: cli.assignment,
    };
    let interactive = cli.interactive || (operations.is_empty() && cli.query.is_none());

    // ── Preconditions ────────────────────────────────────────────────────
    let api_key = cli.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty());
    let input = cli.input.as_deref().map(str::trim).filter(|i| !i.is_empty());
    if let Some(guidance) = check_preconditions(input.is_some(), api_key.is_some(), &Submission::default())
        .filter(|g| matches!(g, Guidance::NoDocument | Guidance::NoCredential))
    {
        print_guidance(guidance);
        return Ok(ExitCode::from(2));
    }
    let (Some(input), Some(api_key)) = (input, api_key) else {
        return Ok(ExitCode::from(2));
    };

    // ── Build session ────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(&cli, progress.clone().map(|p| p as ProgressCallback))?;
    let client = GeminiClient::new(SecretString::from(api_key.to_string()), &config)
        .context("Failed to initialise the Gemini client")?;
    let mut session = Session::new(Arc::new(client), config);

    // ── Load outline ─────────────────────────────────────────────────────
    let loaded = load_outline(&mut session, input, cli.download_timeout).await;
    if let Some(p) = &progress {
        p.finish();
    }
    if let Err(e) = loaded {
        return Err(with_notice(e).context(format!("Could not load '{input}'")));
    }

    if interactive {
        repl(&cli, &mut session, operations, progress.as_deref()).await?;
        return Ok(ExitCode::SUCCESS);
    }

    // ── One-shot submission ──────────────────────────────────────────────
    let submission = Submission::new(cli.query.clone().unwrap_or_default(), operations);
    let outcome = session.submit(&submission).await;
    if let Some(p) = &progress {
        p.finish();
    }
    let outcome = outcome.map_err(with_notice).context("Request failed")?;

    if let SubmissionOutcome::NeedsInput { guidance } = outcome {
        print_guidance(guidance);
        return Ok(ExitCode::from(2));
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&outcome).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_history(&session);
    }

    if let Some(dir) = &cli.export_dir {
        export_downloads(&cli, &session, outcome.records(), dir).await?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `AssistantConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AssistantConfig> {
    let mut builder = AssistantConfig::builder()
        .model(cli.model.clone())
        .temperature(cli.temperature)
        .max_output_tokens(cli.max_tokens)
        .download_timeout_secs(cli.download_timeout)
        .encoding(cli.encoding.into())
        .paper(cli.paper.into());

    if let Some(url) = &cli.base_url {
        builder = builder.base_url(url.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

async fn load_outline(session: &mut Session, input: &str, timeout_secs: u64) -> Result<(), AssistantError> {
    let doc = resolve_input(input, timeout_secs).await?;
    session.load_document(&doc).await?;
    Ok(())
}

/// Attach the user-facing notice to a library error.
fn with_notice(e: AssistantError) -> anyhow::Error {
    let notice = e.notice();
    anyhow::Error::new(e).context(notice)
}

fn print_guidance(guidance: Guidance) {
    eprintln!("{} {}", yellow("ℹ"), guidance.message());
}

fn print_history(session: &Session) {
    if session.history().is_empty() {
        return;
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(out, "\n{}", bold("Chat History"));
    for record in session.history() {
        let _ = writeln!(out, "\n{}", cyan(&bold(record.label())));
        let _ = writeln!(out, "{}", record.response());
    }
    let _ = writeln!(out);
}

/// Write quiz and assignment records from the latest submission, the way
/// the download buttons offered them.
async fn export_downloads(
    cli: &Cli,
    session: &Session,
    records: &[InteractionRecord],
    dir: &Path,
) -> Result<()> {
    for record in records
        .iter()
        .filter(|r| r.kind() != OperationKind::AskQuestion)
    {
        for &format in cli.export_format.formats() {
            export_one(record, format, &session.config().export, dir, cli.quiet).await?;
        }
    }
    Ok(())
}

/// Render and write one artifact. A PDF encoding failure is reported and
/// skipped; the text export is always available.
async fn export_one(
    record: &InteractionRecord,
    format: ExportFormat,
    export: &ExportConfig,
    dir: &Path,
    quiet: bool,
) -> Result<()> {
    let artifact = match ExportArtifact::render(record, format, export) {
        Ok(a) => a,
        Err(e) => {
            let notice = AssistantError::from(e.clone()).notice();
            eprintln!("{} {}  {}", yellow("⚠"), notice, dim(&e.to_string()));
            return Ok(());
        }
    };
    let path = artifact
        .write_to_dir(dir)
        .await
        .map_err(with_notice)
        .context("Export failed")?;
    if !quiet {
        eprintln!(
            "{} Saved {}  {}",
            green("✔"),
            bold(&path.display().to_string()),
            dim(artifact.mime_type)
        );
    }
    Ok(())
}

fn toggles_line(ops: &OperationSet) -> String {
    let mark = |on: bool, name: &str| {
        if on {
            green(&format!("[x] {name}"))
        } else {
            dim(&format!("[ ] {name}"))
        }
    };
    format!(
        "{}  {}  {}",
        mark(ops.ask, "ask"),
        mark(ops.assignment, "assignment"),
        mark(ops.quiz, "quiz")
    )
}

fn toggle(operations: &mut OperationSet, kind: OperationKind) {
    operations.toggle(kind);
    eprintln!("{}", toggles_line(operations));
}

/// Interactive prompt loop.
async fn repl(
    cli: &Cli,
    session: &mut Session,
    mut operations: OperationSet,
    progress: Option<&CliProgressCallback>,
) -> Result<()> {
    let export_dir = cli.export_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    eprintln!("{}", dim("Type a question, or /help for commands."));
    eprintln!("{}", toggles_line(&operations));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{} ", cyan("›"));
        let _ = io::stderr().flush();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            match parts.next().unwrap_or_default() {
                "quit" | "exit" | "q" => break,
                "help" => eprintln!("{REPL_HELP}"),
                "history" => print_history(session),
                "ask" => toggle(&mut operations, OperationKind::AskQuestion),
                "quiz" => toggle(&mut operations, OperationKind::GenerateQuiz),
                "assignment" => toggle(&mut operations, OperationKind::GenerateAssignment),
                "export" => {
                    let index = parts.next().and_then(|n| n.parse::<usize>().ok());
                    let format = match parts.next() {
                        Some("txt") | Some("text") => ExportFormat::Text,
                        _ => ExportFormat::Pdf,
                    };
                    match index.and_then(|n| n.checked_sub(1)).and_then(|i| session.history().get(i)) {
                        Some(record) => {
                            export_one(record, format, &session.config().export, &export_dir, false)
                                .await?;
                        }
                        None => eprintln!(
                            "{} usage: /export <n> [pdf|txt], n between 1 and {}",
                            yellow("⚠"),
                            session.history().len()
                        ),
                    }
                }
                other => eprintln!("{} unknown command '/{other}', try /help", yellow("⚠")),
            }
            continue;
        }

        let submission = Submission::new(line, operations);
        let result = session.submit(&submission).await;
        if let Some(p) = progress {
            p.finish();
        }
        match result {
            Ok(SubmissionOutcome::NeedsInput { guidance }) => print_guidance(guidance),
            Ok(outcome) => {
                if cli.json {
                    match serde_json::to_string_pretty(&outcome) {
                        Ok(json) => println!("{json}"),
                        Err(e) => eprintln!("{} {e}", red("✘")),
                    }
                } else {
                    print_history(session);
                }
                if let Some(dir) = &cli.export_dir {
                    export_downloads(cli, session, outcome.records(), dir).await?;
                }
            }
            Err(e) => {
                eprintln!("{} {}", red("✘"), e.notice());
                eprintln!("  {}", dim(&e.to_string()));
            }
        }
    }
    Ok(())
}
