use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::HostError;
use crate::games::backend_wheel_game::GameSession;

const HELP: &str =
    "commands: spin | drag <deg> | more <deg> | release | settle | cancel | state | quit";

/// One line of terminal input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCommand {
    Spin,
    Drag(f64),
    More(f64),
    Release,
    Settle,
    Cancel,
    State,
    Help,
    Quit,
}

impl FromStr for HostCommand {
    type Err = HostError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();
        let degrees = |arg: Option<&str>| -> Result<f64, HostError> {
            arg.and_then(|a| a.parse::<f64>().ok())
                .filter(|d| d.is_finite())
                .ok_or_else(|| HostError::UnknownCommand(line.trim().to_string()))
        };

        match command.as_str() {
            "spin" => Ok(HostCommand::Spin),
            "drag" => Ok(HostCommand::Drag(degrees(words.next())?)),
            "more" => Ok(HostCommand::More(degrees(words.next())?)),
            "release" => Ok(HostCommand::Release),
            "settle" => Ok(HostCommand::Settle),
            "cancel" => Ok(HostCommand::Cancel),
            "state" => Ok(HostCommand::State),
            "help" | "?" => Ok(HostCommand::Help),
            "quit" | "exit" => Ok(HostCommand::Quit),
            _ => Err(HostError::UnknownCommand(line.trim().to_string())),
        }
    }
}

/// Applies one command. Returns `false` once the player quits.
pub async fn execute(session: &GameSession, command: HostCommand) -> Result<bool, HostError> {
    match command {
        HostCommand::Spin => {
            session.start_free_spin().await?;
        }
        HostCommand::Drag(delta) => {
            session.start_drag(delta).await?;
        }
        HostCommand::More(delta) => {
            let angle = session.continue_drag(delta).await?;
            println!("dial at {:.2}", angle);
        }
        HostCommand::Release => {
            session.end_drag().await?;
        }
        HostCommand::Settle => session.report_settled().await?,
        HostCommand::Cancel => {
            if !session.cancel().await {
                println!("nothing to cancel");
            }
        }
        HostCommand::State => {
            println!(
                "{} (resting at {:.2})",
                session.current_state().await.name(),
                session.resting_angle().await
            );
        }
        HostCommand::Help => println!("{}", HELP),
        HostCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Reads commands line by line until `quit` or end of input.
pub async fn run<R: AsyncBufRead + Unpin>(
    session: &GameSession,
    input: R,
) -> Result<(), HostError> {
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let result = match line.parse::<HostCommand>() {
            Ok(command) => execute(session, command).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_recoverable() => {
                tracing::debug!("Ignored {:?}: {}", line.trim(), e);
                println!("{}", e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
