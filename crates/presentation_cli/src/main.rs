//! ExamVoice CLI
//!
//! Reads study text aloud with the bilingual speech dispatcher and exposes
//! the text pipeline for inspection.

#![allow(clippy::print_stdout)]

mod settings;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use domain::{LanguageCode, VoiceVariant, sanitize_for_speech, segment_bilingual};
use speech::{PlaybackOutcome, SpeechConfig, SpeechDispatcher, build_ssml};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// ExamVoice CLI
#[derive(Parser)]
#[command(name = "examvoice")]
#[command(author, version, about = "Bilingual study text to speech", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./examvoice.toml when present)
    #[arg(short, long, env = "EXAMVOICE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read text aloud and wait until playback ends
    ///
    /// Spans wrapped in `**` are read in the foreign language.
    /// Example: examvoice speak "La palabra **house** significa casa."
    Speak {
        /// Text to read
        text: String,

        /// Language code of the text (defaults to the native language)
        #[arg(short, long)]
        language: Option<LanguageCode>,

        /// Voice variant
        #[arg(long, default_value = "female")]
        variant: VoiceVariant,
    },

    /// Print the language segments of a text as JSON
    Segments {
        /// Text to split
        text: String,
    },

    /// Print the markup sent for a bilingual text
    Ssml {
        /// Text to convert
        text: String,

        /// Voice variant
        #[arg(long, default_value = "female")]
        variant: VoiceVariant,
    },

    /// Print text as it is prepared for speech
    Sanitize {
        /// Text to clean
        text: String,
    },

    /// List voices of the local fallback engine
    Voices,
}

/// Default log filter for a verbosity level; `RUST_LOG` takes precedence
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "examvoice=info,speech=info",
        1 => "examvoice=debug,speech=debug",
        2 => "debug",
        _ => "trace",
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<SpeechConfig> {
    let config = settings::load(path).context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    Ok(config)
}

async fn speak(
    config: &SpeechConfig,
    text: &str,
    language: Option<LanguageCode>,
    variant: VoiceVariant,
) -> anyhow::Result<()> {
    let dispatcher = SpeechDispatcher::from_config(config)?;
    let language = language.unwrap_or_else(|| config.native_language.clone());
    debug!(endpoint = dispatcher.endpoint(), %language, %variant, "Dispatching speech");

    let Some(playback) = dispatcher.request_speech(text, &language, variant) else {
        println!("Nothing to speak");
        return Ok(());
    };

    let outcome = tokio::select! {
        outcome = playback.wait() => outcome,
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted, stopping playback");
            playback.stop();
            playback.wait().await
        },
    };

    match outcome {
        PlaybackOutcome::Completed => Ok(()),
        PlaybackOutcome::Stopped => {
            println!("Stopped");
            Ok(())
        },
        PlaybackOutcome::Failed => anyhow::bail!("Speech could not be played"),
    }
}

async fn list_voices(config: &SpeechConfig) -> anyhow::Result<()> {
    let dispatcher = SpeechDispatcher::from_config(config)?;
    if !dispatcher.local_engine_available().await {
        anyhow::bail!("Local engine {} is not available", dispatcher.local_engine());
    }
    let voices = dispatcher.local_voices().await?;

    if voices.is_empty() {
        println!("No local voices available");
        return Ok(());
    }

    for voice in voices {
        let gender = voice.gender.map_or("-", |g| g.as_str());
        println!(
            "{:<24} {:<8} {:<12} {}",
            voice.id,
            gender,
            voice.languages.join(","),
            voice.name
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter_from_verbosity(cli.verbose)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Speak {
            text,
            language,
            variant,
        } => {
            let config = load_config(cli.config.as_deref())?;
            speak(&config, &text, language, variant).await?;
        },

        Commands::Segments { text } => {
            let segments = segment_bilingual(&sanitize_for_speech(&text));
            println!("{}", serde_json::to_string_pretty(&segments)?);
        },

        Commands::Ssml { text, variant } => {
            let config = load_config(cli.config.as_deref())?;
            let segments = segment_bilingual(&sanitize_for_speech(&text));
            if segments.is_empty() {
                println!("Nothing to speak");
            } else {
                println!(
                    "{}",
                    build_ssml(&segments, &config.voices, variant, &config.foreign_rate)
                );
            }
        },

        Commands::Sanitize { text } => {
            println!("{}", sanitize_for_speech(&text));
        },

        Commands::Voices => {
            let config = load_config(cli.config.as_deref())?;
            list_voices(&config).await?;
        },
    }

    Ok(())
}
