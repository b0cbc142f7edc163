//! CLI for running the page analyzer by hand against saved page snapshots.
//!
//! Reads a screenshot and a markup file, calls the configured OpenAI model,
//! and prints the validated result as JSON. Raw responses that fail to parse
//! or validate are written to `--debug-dir` for inspection.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use clap::{Parser, Subcommand};
use openai_client::OpenAIClient;
use page_analyzer::{
    AnalyzerConfig, AnalyzerError, OpenAIVisionModel, PageAnalysisContext, PageAnalyzer,
    TransportError, VisionModel, VisionRequest,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "analyze-page")]
#[command(about = "Run the page analyzer against a saved screenshot and markup")]
struct Cli {
    /// Directory for raw responses that failed to parse or validate
    #[arg(long, global = true, default_value = "./debug_responses")]
    debug_dir: PathBuf,

    /// Override the model from PAGE_ANALYZER_MODEL
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the page and recommend the next action
    Analyze {
        #[command(flatten)]
        page: PageArgs,

        #[arg(long)]
        url: String,

        #[arg(long, default_value = "collect open procurement opportunities")]
        goal: String,

        #[arg(long, default_value_t = 1)]
        page_number: u32,

        #[arg(long, default_value_t = 1)]
        max_pages: u32,

        #[arg(long, default_value_t = 0)]
        opportunities_found: usize,

        #[arg(long)]
        previous_action: Option<String>,
    },

    /// Extract opportunity records from the page
    Extract {
        #[command(flatten)]
        page: PageArgs,

        #[arg(long)]
        url: String,
    },

    /// Locate a described element on the screenshot
    Find {
        /// Screenshot image file
        #[arg(long)]
        screenshot: PathBuf,

        /// What to look for, e.g. "the Next page button"
        description: String,
    },
}

#[derive(clap::Args)]
struct PageArgs {
    /// Screenshot image file
    #[arg(long)]
    screenshot: PathBuf,

    /// Saved page markup
    #[arg(long)]
    markup: PathBuf,
}

/// Remembers the last raw response so failures can be dumped.
struct Recording<M> {
    inner: M,
    last: Mutex<Option<String>>,
}

impl<M> Recording<M> {
    fn new(inner: M) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }

    fn last_response(&self) -> Option<String> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

#[async_trait]
impl<M: VisionModel> VisionModel for Recording<M> {
    async fn complete(&self, request: VisionRequest) -> Result<String, TransportError> {
        let raw = self.inner.complete(request).await?;
        if let Ok(mut last) = self.last.lock() {
            *last = Some(raw.clone());
        }
        Ok(raw)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,page_analyzer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AnalyzerConfig::from_env()?;
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }

    let (label, screenshot) = match &cli.command {
        Commands::Analyze { page, .. } => ("analyze", &page.screenshot),
        Commands::Extract { page, .. } => ("extract", &page.screenshot),
        Commands::Find { screenshot, .. } => ("find", screenshot),
    };
    if let Some(mime) = mime_for(screenshot) {
        config = config.with_image_mime(mime);
    }

    let client = OpenAIClient::from_env().context("Failed to create OpenAI client")?;
    let model = Arc::new(Recording::new(OpenAIVisionModel::from_config(client, &config)));
    let analyzer = PageAnalyzer::with_config(model.clone(), config);

    let outcome = run(&analyzer, cli.command).await;

    match outcome {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            if let Some(AnalyzerError::Parse(_) | AnalyzerError::Validation(_)) =
                e.downcast_ref::<AnalyzerError>()
            {
                if let Some(raw) = model.last_response() {
                    let path = save_debug_response(&cli.debug_dir, label, &raw)?;
                    eprintln!("Raw model response saved to: {}", path.display());
                }
            }
            Err(e)
        }
    }
}

async fn run<M: VisionModel>(analyzer: &PageAnalyzer<M>, command: Commands) -> Result<String> {
    match command {
        Commands::Analyze {
            page,
            url,
            goal,
            page_number,
            max_pages,
            opportunities_found,
            previous_action,
        } => {
            let (screenshot, markup) = page.load()?;
            let mut context = PageAnalysisContext::new(url, goal)
                .with_page(page_number, max_pages)
                .with_opportunities_found(opportunities_found);
            if let Some(action) = previous_action {
                context = context.with_previous_action(action);
            }
            let analysis = analyzer.analyze_page(&screenshot, &markup, &context).await?;
            to_json(&analysis)
        }
        Commands::Extract { page, url } => {
            let (screenshot, markup) = page.load()?;
            let data = analyzer.extract_data(&screenshot, &markup, &url).await?;
            to_json(&data)
        }
        Commands::Find {
            screenshot,
            description,
        } => {
            let screenshot = read_screenshot(&screenshot)?;
            let target = analyzer.find_element(&screenshot, &description).await?;
            to_json(&target)
        }
    }
}

impl PageArgs {
    fn load(&self) -> Result<(String, String)> {
        let screenshot = read_screenshot(&self.screenshot)?;
        let markup = std::fs::read_to_string(&self.markup)
            .with_context(|| format!("Failed to read markup {}", self.markup.display()))?;
        Ok((screenshot, markup))
    }
}

fn read_screenshot(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read screenshot {}", path.display()))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize result")
}

fn save_debug_response(dir: &Path, label: &str, raw: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create debug dir {}", dir.display()))?;

    let now = chrono::Local::now();
    let path = dir.join(format!(
        "{}_failure_{}.txt",
        label,
        now.format("%Y%m%d_%H%M%S")
    ));
    let contents = format!(
        "# Saved at: {}\n# Response length: {} chars\n\n{}",
        now.to_rfc3339(),
        raw.chars().count(),
        raw
    );
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
