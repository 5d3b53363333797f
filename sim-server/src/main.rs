//! CLI entry point: loads a scenario file, starts one session, and drives
//! its timeline forward until the lesson completes or the process is
//! interrupted.

mod config;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tradesim::lesson::Role;
use tradesim::session::SessionLifecycle;
use tradesim::supervisor::SessionSupervisor;
use tradesim::UserId;

use config::ScenarioConfig;

/// Host a tradesim lesson for a classroom of students.
#[derive(Parser, Debug)]
struct Args {
    /// Path to a scenario TOML file describing the lesson to run.
    #[arg(long)]
    scenario: PathBuf,

    /// How often, in seconds, to advance the session's scripted timeline.
    #[arg(long, default_value_t = 1)]
    tick_seconds: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let scenario = ScenarioConfig::load(&args.scenario)?;
    let scenario_id = scenario.scenario_id.clone();
    let plan = scenario.into_lesson_plan();

    let supervisor = SessionSupervisor::new();
    let handle = supervisor.create_session(plan).await;
    log::info!("session {} created for scenario {scenario_id}", handle.session_id());

    // A bare-bones roster so the lesson has someone to run against; a real
    // deployment joins students as they connect over whatever transport
    // wraps this handle.
    handle.join(UserId(1), "student-1", Role::Speculator).await;
    handle.join(UserId(2), "student-2", Role::Speculator).await;

    handle.start().await?;
    log::info!("session {} started", handle.session_id());

    let mut ticker = tokio::time::interval(Duration::from_secs(args.tick_seconds));
    let mut elapsed_s = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                elapsed_s += args.tick_seconds;
                handle.advance(elapsed_s).await?;
                if handle.lifecycle().await == SessionLifecycle::Completed {
                    log::info!("session {} completed at t+{elapsed_s}s", handle.session_id());
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("shutdown requested, ending session {}", handle.session_id());
                let _ = handle.end().await;
                break;
            }
        }
    }

    supervisor.remove(handle.session_id()).await;
    Ok(())
}
