use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use regex::Regex;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use sedbot::{Bot, ChatEvent, ChatMessage, SedConfig};

/// Replay a chat transcript through the substitution bot.
///
/// Each input line is `<nick> message`. Every line the bot would send to the
/// channel is printed to stdout.
#[derive(Debug, Parser)]
#[command(name = "sedbot", version)]
struct Cli {
    /// TOML config file (history_capacity, max_output_length, [meta_rewrite] enabled)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Network name attached to every message
    #[arg(long, default_value = "local")]
    network: String,

    /// Channel name attached to every message
    #[arg(long, default_value = "#sed")]
    channel: String,

    /// Transcript file, or `-` for stdin
    #[arg(default_value = "-")]
    transcript: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => SedConfig::load(path)?,
        None => SedConfig::default(),
    };
    let bot = Bot::new(config);

    let input: Box<dyn BufRead> = if cli.transcript == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = fs::File::open(&cli.transcript)
            .with_context(|| format!("failed to open {}", cli.transcript))?;
        Box::new(BufReader::new(file))
    };

    let line_re = Regex::new(r"^<([^>\s]+)> ?(.*)$").context("transcript pattern")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    bot.handle_event(&ChatEvent::Connect {
        network: cli.network.clone(),
    });
    for (idx, line) in input.lines().enumerate() {
        let line = line.context("failed to read transcript")?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.trim().is_empty() {
            continue;
        }
        let Some(caps) = line_re.captures(line) else {
            warn!(line = idx + 1, "skipping line without <nick> prefix");
            continue;
        };
        let message = ChatMessage::new(cli.network.as_str(), cli.channel.as_str(), &caps[1], &caps[2]);
        if let Some(reply) = bot.handle_event(&ChatEvent::Message(message)) {
            writeln!(out, "{}", reply.text).context("failed to write output")?;
        }
    }
    bot.handle_event(&ChatEvent::Disconnect {
        network: cli.network,
    });
    Ok(())
}
