// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result, anyhow};
use bookwise::utils::logging::{format_error, format_info, format_success, format_warning};
use bookwise::{
    AnswerEnvelope, Config, PdfLoader, Pipeline, ProgressSpinner, Upload, Validator,
};
use clap::{ArgAction, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "bookwise")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Ask questions about a PDF and get answers with page citations", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Model provider key; only used for requests during this run
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a PDF and answer a single question
    Ask {
        pdf: PathBuf,

        question: String,

        /// Number of pages to retrieve as context
        #[arg(short, long)]
        k: Option<usize>,

        /// Print the answer envelope as JSON
        #[arg(long)]
        json: bool,
    },

    /// Index a PDF, then answer questions read from stdin
    Chat {
        pdf: PathBuf,

        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Show the text extracted from each page of a PDF
    Pages {
        pdf: PathBuf,

        #[arg(long, default_value_t = 200)]
        preview: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    colored::control::set_override(cli.color);
    bookwise::utils::logging::init_logger(cli.color, cli.verbose);

    let config = match cli.config.as_deref() {
        Some(path) if path.exists() => {
            info!("Loading configuration from: {}", path.display());
            Config::load(Some(path)).context("Failed to load configuration")?
        }
        Some(path) => {
            warn!(
                "Config file {} not found, using default configuration",
                path.display()
            );
            Config::load(None).context("Failed to load configuration")?
        }
        None => Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        }),
    };

    match cli.command {
        Commands::Ask {
            pdf,
            question,
            k,
            json,
        } => {
            let api_key = require_api_key(cli.api_key.as_deref())?;
            cmd_ask(config, &pdf, &question, k, json, &api_key, cli.color).await?;
        }
        Commands::Chat { pdf, k } => {
            let api_key = require_api_key(cli.api_key.as_deref())?;
            cmd_chat(config, &pdf, k, &api_key, cli.color).await?;
        }
        Commands::Pages { pdf, preview } => {
            cmd_pages(&config, &pdf, preview)?;
        }
    }

    Ok(())
}

fn require_api_key(api_key: Option<&str>) -> Result<String> {
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(key.to_string()),
        _ => {
            eprintln!("{}", format_error("Please enter an API key."));
            Err(anyhow!("no API key supplied (use --api-key or OPENAI_API_KEY)"))
        }
    }
}

fn read_upload(path: &Path) -> Result<Upload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Upload::new(name, bytes))
}

async fn open_document(
    pipeline: &mut Pipeline,
    path: &Path,
    api_key: &str,
    spinner: ProgressSpinner,
) -> Result<()> {
    let upload = read_upload(path)?;

    match pipeline.open(upload, api_key).await {
        Ok(stats) => {
            spinner.finish(format_success("Processing finished."));
            info!("{}", stats.summary());
            if stats.pages_skipped > 0 {
                eprintln!(
                    "{}",
                    format_warning(&format!(
                        "{} page(s) had no extractable text and cannot be cited ({:.0}% searchable)",
                        stats.pages_skipped,
                        stats.coverage()
                    ))
                );
            }
            Ok(())
        }
        Err(e) => {
            spinner.clear();
            Err(anyhow!(e.user_message()))
        }
    }
}

async fn cmd_ask(
    config: Config,
    pdf: &Path,
    question: &str,
    k: Option<usize>,
    json: bool,
    api_key: &str,
    colored: bool,
) -> Result<()> {
    Validator::validate_query(question).map_err(|e| anyhow!(e.user_message()))?;

    let k = k.unwrap_or(config.retrieval.top_k);
    let mut pipeline = Pipeline::with_openai(config).context("Failed to set up pipeline")?;

    let spinner = if json {
        ProgressSpinner::hidden()
    } else {
        ProgressSpinner::new("Processing...", colored)
    };
    open_document(&mut pipeline, pdf, api_key, spinner).await?;

    let spinner = if json {
        ProgressSpinner::hidden()
    } else {
        ProgressSpinner::new("Processing...", colored)
    };
    let envelope = pipeline.ask_with_k(question, k).await;
    spinner.clear();

    let envelope = envelope.map_err(|e| anyhow!(e.user_message()))?;
    print_answer(&envelope, json)?;

    Ok(())
}

async fn cmd_chat(
    config: Config,
    pdf: &Path,
    k: Option<usize>,
    api_key: &str,
    colored: bool,
) -> Result<()> {
    let k = k.unwrap_or(config.retrieval.top_k);
    let mut pipeline = Pipeline::with_openai(config).context("Failed to set up pipeline")?;

    open_document(
        &mut pipeline,
        pdf,
        api_key,
        ProgressSpinner::new("Processing...", colored),
    )
    .await?;

    println!(
        "{}",
        format_info("Ask a question, `:open <pdf>` to switch documents, `:quit` to exit.")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let line = match parse_chat_line(&line) {
            ChatInput::Quit => break,
            ChatInput::Open("") => {
                eprintln!("{}", format_error("Usage: :open <PDF>"));
                continue;
            }
            ChatInput::Open(path) => {
                let spinner = ProgressSpinner::new("Processing...", colored);
                if let Err(e) = open_document(&mut pipeline, Path::new(path), api_key, spinner).await
                {
                    eprintln!("{}", format_error(&e.to_string()));
                }
                continue;
            }
            ChatInput::Question(question) => question,
        };

        let spinner = ProgressSpinner::new("Processing...", colored);
        let result = pipeline.ask_with_k(line, k).await;
        spinner.clear();

        match result {
            Ok(envelope) => print_answer(&envelope, false)?,
            Err(e) => eprintln!("{}", format_error(&e.user_message())),
        }
    }

    pipeline.close();
    Ok(())
}

#[derive(Debug, PartialEq)]
enum ChatInput<'a> {
    Quit,
    Open(&'a str),
    Question(&'a str),
}

/// `:open` must be its own word; anything unrecognised is a question.
fn parse_chat_line(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line == ":quit" || line == ":q" {
        return ChatInput::Quit;
    }
    if line == ":open" {
        return ChatInput::Open("");
    }
    match line.split_once(char::is_whitespace) {
        Some((":open", path)) => ChatInput::Open(path.trim()),
        _ => ChatInput::Question(line),
    }
}

fn cmd_pages(config: &Config, pdf: &Path, preview: usize) -> Result<()> {
    let upload = read_upload(pdf)?;
    let loader = PdfLoader::new(&config.loader);

    let pages = loader
        .load(&upload.bytes, &upload.name)
        .map_err(|e| anyhow!(e.user_message()))?;

    println!("\n{}: {} page(s)\n", upload.name, pages.len());
    println!("{}", "=".repeat(80));

    for page in &pages {
        if page.is_empty() {
            println!("\nPage {} (no extractable text)", page.page_number());
            continue;
        }

        println!("\nPage {} ({} chars)", page.page_number(), page.text().chars().count());
        for line in Validator::truncate_text(page.text(), preview).lines().take(5) {
            println!("     {}", line);
        }
    }

    println!("\n{}", "=".repeat(80));
    Ok(())
}

fn print_answer(envelope: &AnswerEnvelope, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(envelope).context("Failed to serialize answer")?
        );
    } else {
        println!("\n{}\n", envelope.rendered());
    }
    Ok(())
}
