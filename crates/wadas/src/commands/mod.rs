//! Command dispatch: bridges CLI args -> console views -> output formatting.

pub mod actuators;
pub mod cameras;
pub mod config_cmd;
pub mod events;
pub mod logs;
pub mod util;

use wadas_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to its handler.
pub async fn dispatch(cmd: Command, console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Cameras(args) => cameras::handle(console, args, global).await,
        Command::Actuators(args) => actuators::handle(console, args, global).await,
        Command::Detections(args) => events::handle_detections(console, args, global).await,
        Command::Actuations(args) => events::handle_actuations(console, args, global).await,
        Command::Logs(args) => logs::handle(console, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command routed to the server dispatcher".into(),
        )),
    }
}
