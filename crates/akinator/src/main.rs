//! Akinator - terminal client.
//!
//! Thin interactive wrapper around [`akinator::Akinator`].

#![warn(missing_docs)]

mod cli;

use akinator::{
    Akinator, AkinatorError, AnswerInput, ClientConfig, Language, RegionTable, RejectionKind,
};
use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use strum::IntoEnumIterator;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

const HELP: &str = "Answer with yes/y, no/n, idk/i, probably/p, probably not/pn (or 0-4).\n\
                    Commands: b/back, g/guess, q/quit.";

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };

    match cli.command {
        Command::Play { region } => play(config, region).await,
        Command::Regions => list_regions(&config),
    }
}

/// Prints every language with the endpoint it currently resolves to.
#[instrument(skip(config))]
fn list_regions(config: &ClientConfig) -> Result<()> {
    let table = RegionTable::from_config(config)?;
    for language in Language::iter() {
        let server = table.resolve(Some(language.code()))?;
        println!("{:<4} {:<11} {}", language.code(), language.verbose_name(), server);
    }
    Ok(())
}

/// Runs one interactive game until the user quits or accepts a guess.
#[instrument(skip(config))]
async fn play(config: ClientConfig, region: Option<String>) -> Result<()> {
    let region = region.or_else(|| config.default_region().clone());
    let mut aki = Akinator::connect(&config)?;
    aki.start(region.as_deref())
        .await
        .context("Failed to start a game")?;
    info!(region = ?region, "Game started");

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut offered_at: Option<u32> = None;

    loop {
        let step = aki.step().unwrap_or_default();
        let progression = aki.progression().unwrap_or_default();

        if progression >= *config.guess_threshold() && offered_at != Some(step) {
            offered_at = Some(step);
            if offer_guess(&mut aki, &mut lines).await? {
                return Ok(());
            }
        }

        println!(
            "Q{} ({:.1}%): {}",
            step + 1,
            progression,
            aki.question().unwrap_or_default()
        );

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = line.trim().to_lowercase();
        let result = match command.as_str() {
            "" => continue,
            "q" | "quit" => break,
            "b" | "back" => aki.back().await.map(drop),
            "g" | "guess" => {
                if offer_guess(&mut aki, &mut lines).await? {
                    return Ok(());
                }
                Ok(())
            }
            other => match AnswerInput::parse(other) {
                Ok(input) => aki.answer(input).await.map(drop),
                Err(e) => Err(e),
            },
        };

        if let Err(e) = result {
            if e.rejection_kind() == Some(RejectionKind::NoMoreQuestions) {
                println!("Out of questions.");
                offer_guess(&mut aki, &mut lines).await?;
                return Ok(());
            }
            report(&e);
        }
    }

    debug!("Input closed or user quit");
    Ok(())
}

/// Shows the current guess and asks whether it is right.
async fn offer_guess(aki: &mut Akinator, lines: &mut InputLines) -> Result<bool> {
    let candidate = match aki.guess().await {
        Ok(candidate) => candidate,
        Err(e) => {
            report(&e);
            return Ok(false);
        }
    };

    println!(
        "I think of {} ({})",
        candidate.name().unwrap_or("someone"),
        candidate.description().unwrap_or("no description")
    );
    if let Some(picture) = candidate.absolute_picture_path() {
        println!("  {}", picture);
    }
    println!("Am I right? (y/n)");

    let reply = lines.next_line().await?.unwrap_or_default();
    let correct = matches!(reply.trim().to_lowercase().as_str(), "y" | "yes");
    if correct {
        println!("Great, guessed right once again!");
    }
    Ok(correct)
}

fn report(error: &AkinatorError) {
    if error.is_local() {
        println!("{}", error);
    } else {
        warn!(error = %error, "Request failed");
        println!("Request failed ({}); you can try again.", error);
    }
}
