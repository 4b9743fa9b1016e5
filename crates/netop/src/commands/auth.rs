//! Session handlers: status, login, logout, token.

use dialoguer::Input;
use secrecy::ExposeSecret;

use netop_core::{AuthState, LogoutOutcome, Session};

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

fn status_detail(state: &AuthState, painter: Painter) -> String {
    match state {
        AuthState::Demo { user } => output::detail_lines(&[
            ("Mode", painter.health("demo", true)),
            ("User", user.label().to_owned()),
            ("Role", user.role.clone()),
        ]),
        AuthState::Authenticated { user } => output::detail_lines(&[
            ("Mode", painter.health("signed in", true)),
            ("User", user.label().to_owned()),
            ("ID", user.id.clone()),
            ("Email", user.email.clone().unwrap_or_default()),
            ("Role", user.role.clone()),
        ]),
        AuthState::Unauthenticated { error } => output::detail_lines(&[
            ("Mode", painter.health("signed out", false)),
            ("Error", error.clone().unwrap_or_default()),
        ]),
    }
}

fn mode_label(state: &AuthState) -> String {
    match state {
        AuthState::Demo { .. } => "demo",
        AuthState::Authenticated { .. } => "authenticated",
        AuthState::Unauthenticated { .. } => "unauthenticated",
    }
    .into()
}

pub async fn handle(session: &Session, args: AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Status => {
            let state = session.state();
            let painter = Painter::new(global.color);
            let out = output::render_single(
                global.output,
                state,
                |s| status_detail(s, painter),
                mode_label,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AuthCommand::Login { code } => {
            let auth = session.auth();
            let code = if let Some(code) = code {
                code
            } else {
                let url = auth.login().await?;
                eprintln!("Open this URL in a browser to sign in:\n\n  {url}\n");
                Input::<String>::new()
                    .with_prompt("Authorization code")
                    .interact_text()
                    .map_err(|e| CliError::Internal(format!("prompt failed: {e}")))?
            };
            let user = auth.complete_login(code.trim()).await?;
            util::note(global, &format!("Signed in as {}", user.label()));
            Ok(())
        }

        AuthCommand::Logout => {
            match session.logout().await? {
                LogoutOutcome::DemoCleared => util::note(global, "Left demo mode"),
                LogoutOutcome::SignedOut { logout_url } => {
                    util::note(global, "Signed out");
                    if let Some(url) = logout_url {
                        util::note(global, &format!("End the browser session at: {url}"));
                    }
                }
            }
            Ok(())
        }

        AuthCommand::Token => {
            let token = session.auth().access_token().await?;
            output::print_output(token.expose_secret(), global.quiet);
            Ok(())
        }
    }
}
