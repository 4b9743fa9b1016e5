//! Device command handlers.

use tabled::Tabled;

use netop_core::{Device, DeviceQuery, EntityId, Session};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            device_type: d.device_type.clone(),
            status: d.status.to_string(),
            ip: d.ip_address.map(|ip| ip.to_string()).unwrap_or_default(),
            last_seen: output::opt_timestamp(d.last_seen),
        }
    }
}

fn detail(d: &Device, painter: Painter) -> String {
    output::detail_lines(&[
        ("ID", d.id.to_string()),
        ("Name", d.name.clone()),
        ("Type", d.device_type.clone()),
        ("Status", painter.health(&d.status.to_string(), d.is_online())),
        (
            "Site",
            d.site_id.as_ref().map(ToString::to_string).unwrap_or_default(),
        ),
        ("IP", d.ip_address.map(|ip| ip.to_string()).unwrap_or_default()),
        ("Last Seen", output::opt_timestamp(d.last_seen)),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let data = session.data();

    match args.command {
        DevicesCommand::List { site, status } => {
            let query = DeviceQuery {
                site_id: site.map(EntityId::from),
                status: status.map(util::device_status),
            };
            let devices = data.devices(&query).await?;
            let out = output::render_list(global.output, &devices, |d| DeviceRow::from(d), |d| {
                d.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { id } => {
            let device = data.device(&EntityId::from(id)).await?;
            let painter = Painter::new(global.color);
            let out = output::render_single(
                global.output,
                &device,
                |d| detail(d, painter),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
