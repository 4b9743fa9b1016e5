//! Incident command handlers.

use chrono::Utc;
use tabled::Tabled;

use netop_core::aggregate::{self, IncidentField};
use netop_core::{EntityId, Incident, IncidentPatch, Session};

use crate::cli::{GlobalOpts, GroupBy, IncidentsArgs, IncidentsCommand};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct IncidentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Detected")]
    detected: String,
    #[tabled(rename = "Reviewed")]
    reviewed: String,
}

impl IncidentRow {
    fn new(incident: &Incident, now: chrono::DateTime<Utc>) -> Self {
        Self {
            id: incident.id.to_string(),
            severity: incident.severity.to_string(),
            status: incident.status.to_string(),
            title: incident.title.clone(),
            site: incident.site_label().to_owned(),
            device: incident.device_label().to_owned(),
            detected: output::age(incident.detected_at, now),
            reviewed: if incident.reviewed { "yes" } else { "" }.into(),
        }
    }
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Count")]
    count: usize,
}

#[derive(serde::Serialize)]
struct GroupCount {
    group: String,
    count: usize,
}

fn detail(incident: &Incident, painter: Painter) -> String {
    output::detail_lines(&[
        ("ID", incident.id.to_string()),
        ("Title", incident.title.clone()),
        ("Severity", painter.severity(incident.severity)),
        ("Status", painter.status(incident.status)),
        (
            "Category",
            incident.category.map(|c| c.label().to_owned()).unwrap_or_default(),
        ),
        ("Site", incident.site_label().to_owned()),
        ("Device", incident.device_label().to_owned()),
        ("Detected", output::timestamp(incident.detected_at)),
        ("Resolved", output::opt_timestamp(incident.resolved_at)),
        (
            "Reviewed",
            match incident.reviewed_at {
                Some(at) => format!("yes ({})", output::timestamp(at)),
                None if incident.reviewed => "yes".into(),
                None => painter.dim("no"),
            },
        ),
        ("Description", incident.description.clone()),
        ("Insight", incident.insight.clone().unwrap_or_default()),
    ])
}

fn field(by: GroupBy) -> IncidentField {
    match by {
        GroupBy::Status => IncidentField::Status,
        GroupBy::Severity => IncidentField::Severity,
        GroupBy::Category => IncidentField::Category,
        GroupBy::Site => IncidentField::Site,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: IncidentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let data = session.data();
    let painter = Painter::new(global.color);

    match args.command {
        IncidentsCommand::List(filter) => {
            let (criteria, search) = util::incident_filter(&filter);
            let spinner = util::spinner(global, "Loading incidents");
            let all = data.incidents(&criteria).await;
            spinner.finish_and_clear();
            let all = all?;

            let shown: Vec<Incident> = netop_core::filter::filter(&all, &criteria, &search)
                .into_iter()
                .cloned()
                .collect();
            let now = Utc::now();
            let out = output::render_list(
                global.output,
                &shown,
                |i| IncidentRow::new(i, now),
                |i| i.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            if shown.is_empty() {
                util::note(global, "No incidents match the current filters");
            }
            Ok(())
        }

        IncidentsCommand::Get { id } => {
            let incident = data.incident(&EntityId::from(id)).await?;
            let out = output::render_single(
                global.output,
                &incident,
                |i| detail(i, painter),
                |i| i.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IncidentsCommand::Review { id } => {
            let incident = data.mark_reviewed(&EntityId::from(id)).await?;
            util::note(global, &format!("Incident {} marked as reviewed", incident.id));
            Ok(())
        }

        IncidentsCommand::Status { id, status } => {
            let status = util::incident_status(status)?;
            let incident = data
                .update_incident(&EntityId::from(id), &IncidentPatch::status(status))
                .await?;
            util::note(
                global,
                &format!("Incident {} is now {}", incident.id, incident.status),
            );
            Ok(())
        }

        IncidentsCommand::Insight { id, text } => {
            if text.trim().is_empty() {
                return Err(CliError::validation("text", "insight must not be empty"));
            }
            let patch = IncidentPatch {
                insight: Some(text),
                ..IncidentPatch::default()
            };
            let incident = data.update_incident(&EntityId::from(id), &patch).await?;
            util::note(global, &format!("Insight saved on incident {}", incident.id));
            Ok(())
        }

        IncidentsCommand::Counts { by, filter } => {
            let (criteria, search) = util::incident_filter(&filter);
            let all = data.incidents(&criteria).await?;
            let shown: Vec<Incident> = netop_core::filter::filter(&all, &criteria, &search)
                .into_iter()
                .cloned()
                .collect();

            let counts: Vec<GroupCount> = aggregate::count_incidents_by(&shown, field(by))
                .into_iter()
                .map(|(bucket, count)| GroupCount {
                    group: bucket.to_string(),
                    count,
                })
                .collect();
            let out = output::render_list(
                global.output,
                &counts,
                |c| CountRow {
                    group: c.group.clone(),
                    count: c.count,
                },
                |c| format!("{}\t{}", c.group, c.count),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
