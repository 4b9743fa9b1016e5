//! Command dispatch: CLI args -> session operations -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod dashboard;
pub mod devices;
pub mod incidents;
pub mod notifications;
pub mod settings;
pub mod sites;
pub mod util;

use netop_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a session-bound command to its handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Incidents(args) => incidents::handle(session, args, global).await,
        Command::Sites(args) => sites::handle(session, args, global).await,
        Command::Devices(args) => devices::handle(session, args, global).await,
        Command::Notifications(args) => notifications::handle(session, args, global).await,
        Command::Settings(args) => settings::handle(session, args, global).await,
        Command::Dashboard => dashboard::handle(session, global).await,
        Command::Auth(args) => auth::handle(session, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions run without a session".into(),
        )),
    }
}
