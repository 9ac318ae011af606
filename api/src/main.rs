//! An http api for running a score-prediction contest.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::needless_pass_by_value)]

#[macro_use]
extern crate rocket;

mod helpers;
mod routes;

use anyhow::{Context, anyhow};
use clap::Parser;
use helpers::{CorsFairing, RequestTimingFairing};
use quiniela_common::db_util::{PgStore, load_env_file};
use quiniela_common::{
    DEFAULT_CHUNK_SIZE, LEADERBOARD_SIZE, MemoryStore, Quiniela, SESSION_TTL_MINUTES, Store,
    WorkflowConfig,
};
use rocket::serde::json::{Value, json};
use rocket::{Build, Rocket};
use rocket_prometheus::PrometheusMetrics;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Postgres connection string; without one the contest is kept in memory
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Number of values collected per form step
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, env = "QUINIELA_CHUNK_SIZE")]
    chunk_size: usize,

    /// Minutes a half-finished form is kept, 0 keeps it forever
    #[arg(long, default_value_t = SESSION_TTL_MINUTES, env = "QUINIELA_SESSION_TTL_MINUTES")]
    session_ttl_minutes: i64,

    /// Number of standings returned on a leaderboard
    #[arg(long, default_value_t = LEADERBOARD_SIZE, env = "QUINIELA_LEADERBOARD_SIZE")]
    leaderboard_size: usize,
}

impl Cli {
    fn workflow_config(&self) -> anyhow::Result<WorkflowConfig> {
        let ttl = (self.session_ttl_minutes > 0).then_some(self.session_ttl_minutes);
        WorkflowConfig::new(self.chunk_size, self.leaderboard_size, ttl).map_err(|e| anyhow!(e))
    }

    fn store(&self) -> anyhow::Result<Arc<dyn Store>> {
        match &self.database_url {
            Some(url) => {
                let store = PgStore::connect(url)
                    .map_err(|e| anyhow!(e))
                    .context("Failed to connect to the database")?;
                tracing::info!("Using the Postgres store");
                Ok(Arc::new(store))
            }
            None => {
                tracing::warn!("DATABASE_URL is not set, contest data will be kept in memory");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }
}

#[catch(404)]
fn not_found() -> Value {
    json!({
        "error": "not_found",
        "message": "The requested resource could not be found."
    })
}

/// Assemble the routes and fairings around a contest.
fn build_rocket(contest: Quiniela) -> Rocket<Build> {
    rocket::build()
        .manage(contest)
        .attach(RequestTimingFairing)
        .attach(CorsFairing)
        .mount(
            "/",
            routes![
                routes::open_round,
                routes::create_round,
                routes::delete_round,
                routes::lock_round,
                routes::unlock_round,
                routes::set_fixtures,
                routes::submit_fixtures_phase,
                routes::set_fixture_active,
                routes::set_results,
                routes::submit_results_phase,
                routes::get_prediction,
                routes::begin_submission,
                routes::submit_prediction_phase,
                routes::begin_edit,
                routes::submit_edit_phase,
                routes::score_round,
                routes::score_records,
            ],
        )
        .register("/", catchers![not_found])
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    load_env_file();
    let cli = Cli::parse();
    let contest = Quiniela::new(cli.store()?, cli.workflow_config()?);

    let prometheus = PrometheusMetrics::new();
    build_rocket(contest)
        .attach(prometheus.clone())
        .mount("/metrics", prometheus)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed to launch: {e}"))?;

    Ok(())
}
