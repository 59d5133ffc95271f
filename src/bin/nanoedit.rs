//! CLI for NanoEdit - AI image editing.

use clap::{Args, Parser, Subcommand, ValueEnum};
use nanoedit::{
    Config, EditResult, EditSession, EditState, GeminiEditor, GeminiModel, ImageAsset,
    ImageEditor, Submission,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinHandle};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV_VAR: &str = "NANOEDIT_LOG";

#[derive(Parser)]
#[command(name = "nanoedit")]
#[command(about = "Edit images with natural-language prompts (Gemini Nano Banana)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Gemini image model (overrides NANOEDIT_MODEL)
    #[arg(long, global = true, value_enum)]
    model: Option<ModelArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit an image once and save the result
    Edit(EditArgs),

    /// Interactive editing session
    Shell,

    /// Check configuration and API reachability
    Check,

    /// List available models
    Models,
}

#[derive(Args)]
struct EditArgs {
    /// Image to edit (PNG, JPEG or WebP)
    input: PathBuf,

    /// The editing instruction
    prompt: String,

    /// Output file path (defaults to edited-<input file name>)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    NanoBanana,
    NanoBananaPro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::NanoBanana => GeminiModel::NanoBanana,
            ModelArg::NanoBananaPro => GeminiModel::NanoBananaPro,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::from_env();
    if let Some(model) = cli.model {
        config = config.with_model(model.into());
    }

    match cli.command {
        Commands::Edit(args) => {
            edit_once(&config, args, cli.json).await?;
        }
        Commands::Shell => {
            let editor = Arc::new(GeminiEditor::from_config(&config)?);
            Shell::new(editor).run().await?;
        }
        Commands::Check => {
            check(&config, cli.json).await?;
        }
        Commands::Models => {
            list_models(config.model, cli.json)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn edit_once(config: &Config, args: EditArgs, json_output: bool) -> anyhow::Result<()> {
    let editor = GeminiEditor::from_config(config)?;

    let mut session = EditSession::new();
    session.select_image(ImageAsset::load(&args.input).await?);
    session.set_prompt(args.prompt);

    if let EditState::Failed(message) = session.submit(&editor).await {
        anyhow::bail!("{message}");
    }

    let Some(result) = session.edited() else {
        anyhow::bail!("edit finished without a result");
    };

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(session.download_name()));
    let size = result.save(&output).await?;

    if json_output {
        let report = serde_json::json!({
            "success": true,
            "input": args.input.display().to_string(),
            "output": output.display().to_string(),
            "size_bytes": size,
            "mime_type": result.mime_type,
            "model": editor.model().as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Edited image: {} ({} bytes, {}) via {}",
            output.display(),
            size,
            result.mime_type,
            editor.model()
        );
    }

    Ok(())
}

async fn check(config: &Config, json_output: bool) -> anyhow::Result<()> {
    let editor = GeminiEditor::from_config(config)?;
    let health = editor.health_check().await;

    if json_output {
        let report = serde_json::json!({
            "api_key_configured": config.has_api_key(),
            "model": config.model.as_str(),
            "base_url": config.base_url,
            "reachable": health.is_ok(),
            "error": health.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let key = if config.has_api_key() { "set" } else { "missing" };
        println!("API key:  {key}");
        println!("Model:    {}", config.model);
        println!("Endpoint: {}", config.base_url);
        match &health {
            Ok(()) => println!("Status:   ✓ {} reachable", editor.name()),
            Err(e) => println!("Status:   ✗ {e}"),
        }
    }

    health.map_err(Into::into)
}

fn list_models(selected: GeminiModel, json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ModelInfo {
        alias: &'static str,
        id: &'static str,
        selected: bool,
    }

    let models: Vec<ModelInfo> = GeminiModel::ALL
        .into_iter()
        .map(|m| ModelInfo {
            alias: m.alias(),
            id: m.as_str(),
            selected: m == selected,
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&models)?);
    } else {
        println!("Available models:\n");
        for m in &models {
            let marker = if m.selected { "*" } else { " " };
            println!("  {} {} ({})", marker, m.alias, m.id);
        }
    }

    Ok(())
}

const SHELL_HELP: &str = "\
Commands:
  open <path>     select an image (PNG, JPEG or WebP)
  prompt <text>   set the editing instruction
  edit [text]     submit the edit (optionally setting the prompt first)
  save [path]     write the edited image (default: edited-<file name>)
  status          show the current session
  help            show this help
  quit            leave the shell";

/// Interactive front end over an [`EditSession`].
struct Shell {
    session: EditSession,
    editor: Arc<GeminiEditor>,
    pending: Option<JoinHandle<nanoedit::Result<EditResult>>>,
}

impl Shell {
    fn new(editor: Arc<GeminiEditor>) -> Self {
        Self {
            session: EditSession::new(),
            editor,
            pending: None,
        }
    }

    async fn run(&mut self) -> anyhow::Result<()> {
        println!("NanoEdit - powered by {} ({})", self.editor.name(), self.editor.model());
        println!("{SHELL_HELP}\n");
        show_prompt_marker();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                joined = join_pending(&mut self.pending), if self.pending.is_some() => {
                    self.pending = None;
                    self.settle(joined?);
                    show_prompt_marker();
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if !self.handle(line.trim()).await {
                        break;
                    }
                    show_prompt_marker();
                }
            }
        }

        Ok(())
    }

    /// Runs one command. Returns `false` when the shell should exit.
    async fn handle(&mut self, line: &str) -> bool {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "open" => self.open(rest).await,
            "prompt" => {
                if !self.session.set_prompt(rest) {
                    println!("An edit is in progress; the prompt cannot change right now.");
                }
            }
            "edit" => self.edit(rest),
            "save" => self.save(rest).await,
            "status" => self.status(),
            "help" => println!("{SHELL_HELP}"),
            "quit" | "exit" => return false,
            other => println!("Unknown command '{other}'. Type 'help' for a list."),
        }
        true
    }

    async fn open(&mut self, path: &str) {
        if path.is_empty() {
            println!("Usage: open <path>");
            return;
        }
        if self.session.is_loading() {
            println!("An edit is in progress; wait for it before changing the image.");
            return;
        }
        match ImageAsset::load(path).await {
            Ok(asset) => {
                println!(
                    "Loaded {} ({}, {} bytes)",
                    asset.file_name.as_deref().unwrap_or(path),
                    asset.mime_type,
                    asset.size()
                );
                self.session.select_image(asset);
            }
            Err(e) => println!("Error: {e}"),
        }
    }

    fn edit(&mut self, prompt: &str) {
        if !prompt.is_empty() && !self.session.is_loading() {
            self.session.set_prompt(prompt);
        }

        match self.session.begin_submit() {
            Submission::Started(request) => {
                let editor = Arc::clone(&self.editor);
                self.pending = Some(tokio::spawn(async move {
                    request.execute(editor.as_ref()).await
                }));
                println!("Editing your image...");
            }
            Submission::Rejected(message) => println!("Error: {message}"),
            Submission::Busy => println!("An edit is already in progress."),
        }
    }

    fn settle(&mut self, outcome: nanoedit::Result<EditResult>) {
        self.session.settle(outcome);
        match self.session.state() {
            EditState::Success => println!(
                "\nEdit complete. Use 'save' to write {}.",
                self.session.download_name()
            ),
            EditState::Failed(message) => println!("\nError: {message}"),
            _ => {}
        }
    }

    async fn save(&self, path: &str) {
        let Some(result) = self.session.edited() else {
            println!("There is no edited image to save yet.");
            return;
        };
        let target = if path.is_empty() {
            PathBuf::from(self.session.download_name())
        } else {
            PathBuf::from(path)
        };
        match result.save(&target).await {
            Ok(size) => println!("Saved {} ({} bytes)", target.display(), size),
            Err(e) => println!("Error: {e}"),
        }
    }

    fn status(&self) {
        let state = match self.session.state() {
            EditState::Idle => "idle".to_string(),
            EditState::AwaitingImage => "waiting for an image".to_string(),
            EditState::Ready => "ready".to_string(),
            EditState::Submitting => "editing...".to_string(),
            EditState::Success => "done".to_string(),
            EditState::Failed(message) => format!("failed: {message}"),
        };
        println!("State:  {state}");

        match self.session.original() {
            Some(asset) => println!(
                "Image:  {} ({}, {} bytes)",
                asset.file_name.as_deref().unwrap_or("<unnamed>"),
                asset.mime_type,
                asset.size()
            ),
            None => println!("Image:  none"),
        }

        let prompt = self.session.prompt();
        println!("Prompt: {}", if prompt.is_empty() { "<empty>" } else { prompt });

        if let Some(result) = self.session.edited() {
            let uri = result.to_data_uri();
            let preview: String = uri.chars().take(48).collect();
            println!("Result: {preview}... ({} chars)", uri.len());
        }
    }
}

async fn join_pending<T>(pending: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match pending {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

fn show_prompt_marker() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
