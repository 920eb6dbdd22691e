use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

use crate::collaborators::{spawn_collaborator, Haptics, Notifier, Presentation};
use crate::config::HostConfig;
use crate::games::backend_wheel_game::WheelGameState;

mod collaborators;
mod config;
mod driver;
mod error;
mod games;
mod logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::from_path(".env").ok();
    logging::setup()?;

    let config = HostConfig::from_env()?;
    let pool = Arc::new(config.load_pool()?);
    info!(
        "🎡 SPIN & DARE ready: {} challenges, {:?}",
        pool.len(),
        config.policy()
    );

    let state = WheelGameState::new(pool, config.spin.clone(), config.seed);
    let session = state.create_session().await?;

    let helpers = (
        spawn_collaborator(Presentation::new(session.id(), std::io::stdout()), session.subscribe()),
        spawn_collaborator(Haptics::default(), session.subscribe()),
        spawn_collaborator(Notifier::default(), session.subscribe()),
    );

    let input = BufReader::new(tokio::io::stdin());
    let result = driver::run(&session, input).await;

    state.close_session(session.id()).await;
    drop(session);
    let (presentation, haptics, notifier) = futures::join!(helpers.0, helpers.1, helpers.2);
    if let (Ok(_), Ok(haptics), Ok(notifier)) = (presentation, haptics, notifier) {
        info!(
            "Session over: {} haptic patterns, {} challenges shown",
            haptics.patterns_played,
            notifier.shown.len()
        );
    }

    result?;
    Ok(())
}
