//! Notification preference handlers.

use tabled::Tabled;

use netop_core::{EntityId, NotificationPreference, PreferenceQuery, PreferenceSummary, Session};

use crate::cli::{GlobalOpts, NotificationsArgs, NotificationsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

fn flag(on: bool) -> String {
    if on { "on" } else { "off" }.into()
}

#[derive(Tabled)]
struct PreferenceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Push")]
    push: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Quiet Hours")]
    quiet: String,
}

impl From<&NotificationPreference> for PreferenceRow {
    fn from(p: &NotificationPreference) -> Self {
        let quiet = match (p.quiet_hours_start, p.quiet_hours_end) {
            (Some(start), Some(end)) => {
                format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
            }
            _ => String::new(),
        };
        Self {
            id: p.id.to_string(),
            category: p.category.label().into(),
            severity: p.severity.to_string(),
            enabled: flag(p.enabled),
            push: flag(p.push),
            email: flag(p.email),
            quiet,
        }
    }
}

fn print_list(prefs: &[NotificationPreference], global: &GlobalOpts) {
    let out = output::render_list(
        global.output,
        prefs,
        |p| PreferenceRow::from(p),
        |p| p.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

fn summary_detail(s: &PreferenceSummary) -> String {
    output::detail_lines(&[
        ("Active rules", s.active.to_string()),
        ("Push channels", s.push.to_string()),
        ("Email channels", s.email.to_string()),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: NotificationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let prefs = session.preferences()?;

    match args.command {
        NotificationsCommand::List { category, severity } => {
            let query = PreferenceQuery {
                category: category.map(util::category),
                severity: severity.map(util::severity),
            };
            let list = prefs.list(&query).await?;
            print_list(&list, global);
            Ok(())
        }

        NotificationsCommand::Enable { category, severity } => {
            let pref = prefs
                .set_enabled(util::category(category), util::severity(severity), true)
                .await?;
            util::note(global, &format!("Enabled {} / {}", pref.category.label(), pref.severity));
            Ok(())
        }

        NotificationsCommand::Disable { category, severity } => {
            let pref = prefs
                .set_enabled(util::category(category), util::severity(severity), false)
                .await?;
            util::note(global, &format!("Disabled {} / {}", pref.category.label(), pref.severity));
            Ok(())
        }

        NotificationsCommand::Channel { id, channel, state } => {
            let pref = prefs
                .set_channel(&EntityId::from(id), util::channel(channel), state.enabled())
                .await?;
            print_list(std::slice::from_ref(&pref), global);
            Ok(())
        }

        NotificationsCommand::Critical => {
            let updated = prefs.bulk_enable_critical().await?;
            util::note(
                global,
                &format!("Enabled every channel on {} critical rules", updated.len()),
            );
            Ok(())
        }

        NotificationsCommand::Severity { severity, state } => {
            let updated = prefs
                .set_severity_enabled(util::severity(severity), state.enabled())
                .await?;
            util::note(
                global,
                &format!(
                    "{} {} {} rules",
                    if state.enabled() { "Enabled" } else { "Disabled" },
                    updated.len(),
                    util::severity(severity),
                ),
            );
            Ok(())
        }

        NotificationsCommand::Summary => {
            let summary = prefs.summary().await?;
            let out = output::render_single(global.output, &summary, summary_detail, |s| {
                format!("{}\t{}\t{}", s.active, s.push, s.email)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
