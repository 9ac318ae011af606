//! Administration commands for the quiniela contest.

#![warn(clippy::all, clippy::pedantic)]

use anyhow::{Result, anyhow};
use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use log::info;
use quiniela_common::db_util::{PgStore, load_env_file};
use quiniela_common::scoring::RoundScoring;
use quiniela_common::{
    FixtureRecord, LEADERBOARD_SIZE, PredictionRecord, Quiniela, WorkflowConfig,
};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Number of standings printed on a leaderboard
    #[arg(long, default_value_t = LEADERBOARD_SIZE, env = "QUINIELA_LEADERBOARD_SIZE")]
    leaderboard_size: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new round
    CreateRound { round: u32 },
    /// Remove a round with its fixtures, predictions and scores
    DeleteRound { round: u32 },
    /// Stop accepting predictions for a round
    Lock { round: u32 },
    /// Accept predictions for a round again
    Unlock { round: u32 },
    /// Set the fixture titles of a round, in slot order
    SetFixtures {
        round: u32,
        #[arg(required = true)]
        titles: Vec<String>,
    },
    /// Enter the real results of a round, in slot order
    SetResults {
        round: u32,
        #[arg(required = true)]
        results: Vec<String>,
    },
    /// Exclude a fixture from scoring
    Suspend { round: u32, slot: u8 },
    /// Include a suspended fixture in scoring again
    Activate { round: u32, slot: u8 },
    /// Score a round and print its leaderboard
    Score { round: u32 },
    /// Print every score record of a round
    Scores { round: u32 },
    /// Print a participant's prediction for a round
    ShowPrediction { round: u32, user: String },
    /// Print the latest round still waiting for results
    OpenRound,
}

fn render_fixtures(fixtures: &[FixtureRecord]) -> Vec<String> {
    fixtures
        .iter()
        .map(|f| {
            let result = f.result.as_deref().unwrap_or("-");
            let suspended = if f.active { "" } else { " (suspended)" };
            format!("{:>2}. {} [{result}]{suspended}", f.slot, f.title)
        })
        .collect()
}

fn render_leaderboard(scoring: &RoundScoring) -> Vec<String> {
    let mut lines = vec![format!(
        "=== ROUND {} LEADERBOARD ({} participants) ===",
        scoring.round,
        scoring.standings.len()
    )];
    lines.extend(
        scoring
            .leaderboard
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{:>2}. {} - {} pts", i + 1, s.user_id, s.points)),
    );
    lines
}

fn render_prediction(prediction: &PredictionRecord) -> Vec<String> {
    let mut lines = vec![format!(
        "Prediction of {} for round {}, last changed {}",
        prediction.user_id,
        prediction.round,
        prediction
            .submitted_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    )];
    lines.extend(
        prediction
            .scores
            .iter()
            .enumerate()
            .map(|(i, score)| format!("{:>2}. {score}", i + 1)),
    );
    lines
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn run(contest: &Quiniela, command: Command) -> Result<()> {
    match command {
        Command::CreateRound { round } => {
            contest.create_round(round)?;
            println!("Round {round} created.");
        }
        Command::DeleteRound { round } => {
            contest.delete_round(round)?;
            println!("Round {round} deleted.");
        }
        Command::Lock { round } => {
            contest.lock_round(round)?;
            println!("Round {round} locked.");
        }
        Command::Unlock { round } => {
            contest.unlock_round(round)?;
            println!("Round {round} unlocked.");
        }
        Command::SetFixtures { round, titles } => {
            let fixtures = contest.set_fixtures(round, &titles)?;
            print_lines(&render_fixtures(&fixtures));
        }
        Command::SetResults { round, results } => {
            let fixtures = contest.set_results(round, &results)?;
            print_lines(&render_fixtures(&fixtures));
        }
        Command::Suspend { round, slot } => {
            let fixture = contest.set_fixture_active(round, slot, false)?;
            println!("Fixture {slot} of round {round} suspended: {}", fixture.title);
        }
        Command::Activate { round, slot } => {
            let fixture = contest.set_fixture_active(round, slot, true)?;
            println!("Fixture {slot} of round {round} activated: {}", fixture.title);
        }
        Command::Score { round } => {
            let scoring = contest.score(round)?;
            print_lines(&render_leaderboard(&scoring));
        }
        Command::Scores { round } => {
            for record in contest.score_records(round)? {
                println!(
                    "{} {} - {} pts",
                    record.computed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                    record.user_id,
                    record.points
                );
            }
        }
        Command::ShowPrediction { round, user } => match contest.get_prediction(&user, round)? {
            Some(prediction) => print_lines(&render_prediction(&prediction)),
            None => println!("User {user} has no prediction for round {round}."),
        },
        Command::OpenRound => match contest.latest_open_round()? {
            Some(round) => println!("Round {round} is waiting for results."),
            None => println!("No round is waiting for results."),
        },
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    load_env_file();
    let cli = Cli::parse();

    let store = PgStore::connect(&cli.database_url).map_err(|e| anyhow!(e))?;
    info!("Database connection established.");

    let config = WorkflowConfig {
        leaderboard_size: cli.leaderboard_size,
        ..WorkflowConfig::default()
    };
    let contest = Quiniela::new(Arc::new(store), config);

    run(&contest, cli.command)
}
