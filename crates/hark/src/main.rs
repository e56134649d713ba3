//! # hark
//!
//! Command-line entry point. Loads settings, initializes logging, builds the
//! dispatcher from settings and runs one transcription, printing the text to
//! stdout. Ctrl-C cancels the run.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use hark_core::{
    AudioUpload, ChatId, CredentialId, FlowId, ProviderKind, ResolvedCredential, RunContext,
    TranscriptionConfig,
};
use hark_dispatch::{Dispatcher, FileCredentialStore};
use hark_settings::HarkSettings;

/// Transcribe stored audio through a configured speech-to-text provider.
#[derive(Parser, Debug)]
#[command(name = "hark", version, about)]
struct Cli {
    /// Settings file (defaults to `~/.hark/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transcribe one stored recording.
    Transcribe(TranscribeArgs),
    /// List provider identifiers accepted in `--provider` / `name`.
    Providers,
    /// Store a credential in the local credential file.
    SetCredential(SetCredentialArgs),
}

#[derive(Args, Debug)]
struct TranscribeArgs {
    /// Flow that owns the recording.
    #[arg(long)]
    flow_id: String,

    /// Conversation the recording belongs to.
    #[arg(long)]
    chat_id: String,

    /// Stored file name.
    #[arg(long)]
    file: String,

    /// JSON file holding the transcription config (`{"name": ..., "credentialId": ...}`).
    #[arg(long, conflicts_with_all = ["provider", "credential", "language", "temperature", "prompt", "base_url", "model"])]
    stt_config: Option<PathBuf>,

    /// Provider identifier, e.g. `localAISTT`.
    #[arg(long)]
    provider: Option<String>,

    /// Credential id in the credential store.
    #[arg(long)]
    credential: Option<String>,

    /// Language hint.
    #[arg(long)]
    language: Option<String>,

    /// Sampling temperature as a decimal string.
    #[arg(long)]
    temperature: Option<String>,

    /// Prompt to guide the transcription.
    #[arg(long)]
    prompt: Option<String>,

    /// Endpoint override.
    #[arg(long)]
    base_url: Option<String>,

    /// Model name (`LocalAI` only).
    #[arg(long)]
    model: Option<String>,
}

impl TranscribeArgs {
    /// Config from `--stt-config` or the individual flags.
    ///
    /// `None` when neither is given; the dispatcher reports that.
    fn config(&self) -> Result<Option<TranscriptionConfig>> {
        if let Some(path) = &self.stt_config {
            return load_config_file(path).map(Some);
        }
        let Some(provider) = &self.provider else {
            return Ok(None);
        };
        Ok(Some(TranscriptionConfig {
            provider: provider.clone(),
            credential_id: self.credential.clone().map(CredentialId::from),
            language: self.language.clone(),
            temperature: self.temperature.clone(),
            prompt: self.prompt.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }))
    }
}

#[derive(Args, Debug)]
struct SetCredentialArgs {
    /// Credential id.
    #[arg(long)]
    id: String,

    /// Display name.
    #[arg(long, default_value = "")]
    name: String,

    /// Secret field as `key=value`; repeatable.
    #[arg(long = "field", value_parser = parse_field, required = true)]
    fields: Vec<(String, String)>,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

fn load_config_file(path: &Path) -> Result<TranscriptionConfig> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Invalid config in {}", path.display()))
}

fn load_settings(path: Option<&Path>) -> Result<HarkSettings> {
    let settings = match path {
        Some(p) => hark_settings::load_settings_from_path(p),
        None => hark_settings::load_settings(),
    };
    settings.context("Failed to load settings")
}

async fn transcribe(settings: &HarkSettings, args: &TranscribeArgs) -> Result<()> {
    let config = args.config()?;
    let dispatcher =
        Dispatcher::from_settings(settings).context("Failed to build dispatcher")?;

    let upload = AudioUpload::new(args.file.as_str(), args.flow_id.as_str(), args.chat_id.as_str());
    let ctx = RunContext::new(FlowId::from(args.flow_id.as_str()), ChatId::from(args.chat_id.as_str()));

    let cancel = ctx.cancel.clone();
    let _ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            cancel.cancel();
        }
    });

    let text = dispatcher.transcribe(&upload, config.as_ref(), &ctx).await?;
    if let Some(text) = text {
        println!("{text}");
    }
    Ok(())
}

async fn set_credential(settings: &HarkSettings, args: SetCredentialArgs) -> Result<()> {
    if args.id.trim().is_empty() {
        bail!("credential id must not be empty");
    }
    let store = FileCredentialStore::from_settings(&settings.credentials);
    let data: ResolvedCredential = args.fields.into_iter().collect();
    let field_count = data.len();
    store
        .save_credential(&CredentialId::from(args.id.as_str()), args.name, data)
        .await
        .with_context(|| format!("Failed to write {}", store.path().display()))?;
    tracing::info!(id = %args.id, fields = field_count, path = %store.path().display(), "credential saved");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref())?;

    if settings.logging.json {
        hark_core::logging::init_json_subscriber(&settings.logging.level);
    } else {
        hark_core::logging::init_subscriber(&settings.logging.level);
    }

    match cli.command {
        Command::Transcribe(args) => transcribe(&settings, &args).await,
        Command::Providers => {
            for kind in ProviderKind::ALL {
                println!("{}\t{}", kind.as_str(), kind.label());
            }
            Ok(())
        }
        Command::SetCredential(args) => set_credential(&settings, args).await,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
