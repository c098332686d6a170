use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gemini_deck::audio::{self, AudioSampleBuffer};
use gemini_deck::gemini::{GeminiClient, Voice, mime_for_extension};
use gemini_deck::{Config, SpeechService};

/// Gemini Deck - multi-panel console for the Gemini generative API
#[derive(Parser)]
#[command(name = "gemdeck", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Quick low-latency question answering
    Ask {
        /// The question to ask
        prompt: String,
    },
    /// Interactive multi-turn chat (history kept in memory only)
    Chat,
    /// Analyze and summarize a document
    Analyze {
        /// Path to a text file to analyze
        file: PathBuf,
        /// Use the thinking model with an extended reasoning budget
        #[arg(long)]
        thinking: bool,
    },
    /// Grounded web search with source citations
    Search {
        /// The query to search for
        query: String,
    },
    /// Edit an image according to a prompt
    EditImage {
        /// Path to the input image
        image: PathBuf,
        /// Editing instruction
        prompt: String,
        /// Where to write the edited image
        #[arg(short, long, default_value = "edited.png")]
        output: PathBuf,
    },
    /// Synthesize speech and play it
    Speak {
        /// Text to speak
        text: String,
        /// Voice preset (kore, puck, charon, fenrir, aoede)
        #[arg(long, env = "GEMDECK_VOICE")]
        voice: Option<String>,
        /// Playback speed multiplier (0.5 to 2.0)
        #[arg(long)]
        speed: Option<f32>,
        /// Pitch shift in semitones (-12 to 12)
        #[arg(long)]
        pitch: Option<f32>,
        /// Also write the synthesized audio to a WAV file
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Test speaker output with a sine tone
    TestSpeaker,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,gemini_deck=info",
        1 => "info,gemini_deck=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Ask { prompt } => cmd_ask(&prompt).await,
        Command::Chat => cmd_chat().await,
        Command::Analyze { file, thinking } => cmd_analyze(&file, thinking).await,
        Command::Search { query } => cmd_search(&query).await,
        Command::EditImage {
            image,
            prompt,
            output,
        } => cmd_edit_image(&image, &prompt, &output).await,
        Command::Speak {
            text,
            voice,
            speed,
            pitch,
            save,
        } => cmd_speak(&text, voice.as_deref(), speed, pitch, save.as_deref()).await,
        Command::TestSpeaker => cmd_test_speaker(),
    }
}

/// Build a client from loaded configuration
fn client() -> anyhow::Result<(Config, GeminiClient)> {
    let config = Config::load()?;
    let client = GeminiClient::with_models(config.api_key.clone(), config.models.clone())?;
    Ok((config, client))
}

/// Quick Q&A against the low-latency model
async fn cmd_ask(prompt: &str) -> anyhow::Result<()> {
    let (_, client) = client()?;
    let answer = client.quick_response(prompt).await?;
    println!("{answer}");
    Ok(())
}

/// Interactive chat loop; empty input or "exit" ends the session
#[allow(clippy::future_not_send)]
async fn cmd_chat() -> anyhow::Result<()> {
    let (_, client) = client()?;
    let mut session = client.start_chat();

    println!("Chat started. Empty input or \"exit\" to quit.\n");

    loop {
        let input: String = dialoguer::Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;

        let input = input.trim().to_string();
        if input.is_empty() || input.eq_ignore_ascii_case("exit") {
            break;
        }

        match session.send(&input).await {
            Ok(reply) => println!("\n{reply}\n"),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    tracing::debug!(turns = session.turn_count(), "chat session ended");
    Ok(())
}

/// Document analysis from a local text file
async fn cmd_analyze(file: &Path, thinking: bool) -> anyhow::Result<()> {
    let (_, client) = client()?;
    let document = std::fs::read_to_string(file)?;

    if thinking {
        println!("Analyzing with thinking mode (this can take a while)...\n");
    }

    let summary = client.analyze_document(&document, thinking).await?;
    println!("{summary}");
    Ok(())
}

/// Grounded search printing the answer followed by its sources
async fn cmd_search(query: &str) -> anyhow::Result<()> {
    let (_, client) = client()?;
    let answer = client.grounded_search(query).await?;

    println!("{}", answer.text);

    if !answer.sources.is_empty() {
        println!("\nSources:");
        for source in &answer.sources {
            println!("  - {} <{}>", source.title, source.uri);
        }
    }

    Ok(())
}

/// Image editing: file in, file out
async fn cmd_edit_image(image: &Path, prompt: &str, output: &Path) -> anyhow::Result<()> {
    let (_, client) = client()?;

    let bytes = std::fs::read(image)?;
    let mime_type = image
        .extension()
        .and_then(|e| e.to_str())
        .map_or("image/jpeg", mime_for_extension);

    println!("Editing {} ({} bytes)...", image.display(), bytes.len());

    let edited = client.edit_image(prompt, &bytes, mime_type).await?;
    std::fs::write(output, &edited.bytes)?;

    println!(
        "Wrote {} ({}, {} bytes)",
        output.display(),
        edited.mime_type,
        edited.bytes.len()
    );
    Ok(())
}

/// Synthesize speech, optionally export WAV, and play to completion
#[allow(clippy::future_not_send)]
async fn cmd_speak(
    text: &str,
    voice: Option<&str>,
    speed: Option<f32>,
    pitch: Option<f32>,
    save: Option<&Path>,
) -> anyhow::Result<()> {
    let (config, client) = client()?;

    let voice = match voice {
        Some(name) => name.parse::<Voice>()?,
        None => config.tts.voice,
    };
    let speed = clamp_arg("speed", speed.unwrap_or(config.tts.speed), 0.5, 2.0);
    let pitch = clamp_arg("pitch", pitch.unwrap_or(config.tts.pitch), -12.0, 12.0);

    println!("Synthesizing with voice {voice}...");

    let mut service = SpeechService::new(client)?;
    let buffer = service.synthesize_buffer(text, voice).await?;

    if let Some(path) = save {
        let wav = audio::samples_to_wav(buffer.samples(), buffer.sample_rate())?;
        std::fs::write(path, wav)?;
        println!("Saved {}", path.display());
    }

    let duration = buffer.duration();
    println!(
        "Playing {:.1}s of audio (speed {speed}, pitch {pitch})...",
        duration.as_secs_f32()
    );

    service.playback_mut().play(buffer, speed, pitch)?;
    service.wait();

    Ok(())
}

/// Clamp a playback argument to its supported range, warning when out of it
fn clamp_arg(name: &str, value: f32, min: f32, max: f32) -> f32 {
    if value < min || value > max {
        tracing::warn!(name, value, min, max, "value out of range, clamping");
    }
    value.clamp(min, max)
}

/// Test speaker output with a sine wave
fn cmd_test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut playback = gemini_deck::AudioPlayback::new()?;

    // Generate 2 seconds of 440Hz sine wave at the speech sample rate
    let sample_rate = audio::SAMPLE_RATE;
    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (sample_rate as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), sample_rate);

    playback.play(AudioSampleBuffer::from_samples(samples), 1.0, 0.0)?;
    playback.wait();

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");
    println!("  3. Try: pavucontrol (to check output levels)");

    Ok(())
}
