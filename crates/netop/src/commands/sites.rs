//! Site command handlers.

use serde::Serialize;
use tabled::Tabled;

use netop_core::{Device, DeviceQuery, EntityId, Session, Site};

use crate::cli::{GlobalOpts, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::devices::DeviceRow;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Devices")]
    devices: u32,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&Site> for SiteRow {
    fn from(s: &Site) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            location: s.location.clone(),
            status: s.status.to_string(),
            devices: s.device_count,
            updated: output::opt_timestamp(s.last_updated),
        }
    }
}

/// A site with the devices it hosts.
#[derive(Serialize)]
struct SiteDetail {
    #[serde(flatten)]
    site: Site,
    devices: Vec<Device>,
}

fn detail(d: &SiteDetail, painter: Painter) -> String {
    let s = &d.site;
    let mut text = output::detail_lines(&[
        ("ID", s.id.to_string()),
        ("Name", s.name.clone()),
        ("Location", s.location.clone()),
        ("Status", painter.health(&s.status.to_string(), s.is_online())),
        ("Devices", s.device_count.to_string()),
        ("Updated", output::opt_timestamp(s.last_updated)),
    ]);
    if !d.devices.is_empty() {
        let rows: Vec<DeviceRow> = d.devices.iter().map(DeviceRow::from).collect();
        text.push_str("\n\n");
        text.push_str(&output::render_table(&rows));
    }
    text
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: SitesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let data = session.data();

    match args.command {
        SitesCommand::List => {
            let sites = data.sites().await?;
            let out = output::render_list(global.output, &sites, |s| SiteRow::from(s), |s| {
                s.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Get { id } => {
            let id = EntityId::from(id);
            let query = DeviceQuery {
                site_id: Some(id.clone()),
                ..DeviceQuery::default()
            };
            let (site, devices) = tokio::try_join!(data.site(&id), data.devices(&query))?;
            let detail_view = SiteDetail { site, devices };
            let painter = Painter::new(global.color);
            let out = output::render_single(
                global.output,
                &detail_view,
                |d| detail(d, painter),
                |d| d.site.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
