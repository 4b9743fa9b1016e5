//! Home view: headline counts and the most recent incidents.

use chrono::Utc;
use tabled::Tabled;

use netop_core::{Dashboard, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

#[derive(Tabled)]
struct RecentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Detected")]
    detected: String,
}

fn render(d: &Dashboard, painter: Painter) -> String {
    let breakdown = d
        .active_by_severity
        .iter()
        .map(|(severity, count)| format!("{} {count}", painter.severity(*severity)))
        .collect::<Vec<_>>()
        .join("  ");

    let mut text = output::detail_lines(&[
        ("Active incidents", d.active_incidents.to_string()),
        ("By severity", breakdown),
        (
            "Sites online",
            painter.health(
                &format!("{}/{}", d.sites_online, d.sites_total),
                d.sites_online == d.sites_total,
            ),
        ),
        (
            "Devices online",
            painter.health(
                &format!("{}/{}", d.devices_online, d.devices_total),
                d.devices_online == d.devices_total,
            ),
        ),
    ]);

    if !d.recent.is_empty() {
        let now = Utc::now();
        let rows: Vec<RecentRow> = d
            .recent
            .iter()
            .map(|i| RecentRow {
                id: i.id.to_string(),
                severity: i.severity.to_string(),
                title: i.title.clone(),
                site: i.site_label().to_owned(),
                detected: output::age(i.detected_at, now),
            })
            .collect();
        text.push_str("\n\nRecent incidents\n");
        text.push_str(&output::render_table(&rows));
    }
    text
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let spinner = util::spinner(global, "Loading dashboard");
    let snapshot = session.data().snapshot().await;
    spinner.finish_and_clear();

    let dashboard = Dashboard::from_snapshot(&snapshot?);
    let painter = Painter::new(global.color);
    let out = output::render_single(
        global.output,
        &dashboard,
        |d| render(d, painter),
        |d| d.active_incidents.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
