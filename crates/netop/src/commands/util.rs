//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use netop_core::{
    Category, Channel, DeviceStatus, IncidentFilter, IncidentStatus, Severity, StatusFilter,
};

use crate::cli::{
    CategoryArg, ChannelArg, DeviceStatusArg, GlobalOpts, IncidentFilterArgs, SeverityArg,
    StatusArg,
};
use crate::error::CliError;

pub fn severity(arg: SeverityArg) -> Severity {
    match arg {
        SeverityArg::Critical => Severity::Critical,
        SeverityArg::High => Severity::High,
        SeverityArg::Medium => Severity::Medium,
        SeverityArg::Low => Severity::Low,
    }
}

pub fn status_filter(arg: StatusArg) -> StatusFilter {
    match arg {
        StatusArg::All => StatusFilter::All,
        StatusArg::Open => StatusFilter::Only(IncidentStatus::Open),
        StatusArg::Investigating => StatusFilter::Only(IncidentStatus::Investigating),
        StatusArg::Resolved => StatusFilter::Only(IncidentStatus::Resolved),
        StatusArg::Closed => StatusFilter::Only(IncidentStatus::Closed),
    }
}

/// A concrete status for transitions; "all" is not one.
pub fn incident_status(arg: StatusArg) -> Result<IncidentStatus, CliError> {
    match status_filter(arg) {
        StatusFilter::Only(status) => Ok(status),
        StatusFilter::All => Err(CliError::validation(
            "status",
            "expected open, investigating, resolved or closed",
        )),
    }
}

pub fn category(arg: CategoryArg) -> Category {
    match arg {
        CategoryArg::Operational => Category::Operational,
        CategoryArg::NetworkUtilization => Category::NetworkUtilization,
        CategoryArg::NetworkPerformance => Category::NetworkPerformance,
        CategoryArg::ServicePerformance => Category::ServicePerformance,
        CategoryArg::ResourceUtilization => Category::ResourceUtilization,
    }
}

pub fn channel(arg: ChannelArg) -> Channel {
    match arg {
        ChannelArg::Push => Channel::Push,
        ChannelArg::Email => Channel::Email,
    }
}

pub fn device_status(arg: DeviceStatusArg) -> DeviceStatus {
    match arg {
        DeviceStatusArg::Online => DeviceStatus::Online,
        DeviceStatusArg::Offline => DeviceStatus::Offline,
        DeviceStatusArg::Degraded => DeviceStatus::Degraded,
    }
}

/// Criteria and search term from the shared filter flags.
pub fn incident_filter(args: &IncidentFilterArgs) -> (IncidentFilter, String) {
    let mut criteria = IncidentFilter::default().with_status(status_filter(args.status));
    if let Some(s) = args.severity {
        criteria = criteria.with_severity(severity(s));
    }
    if let Some(c) = args.category {
        criteria = criteria.with_category(category(c));
    }
    if let Some(ref site) = args.site {
        criteria = criteria.with_site(site.clone());
    }
    (criteria, args.search.clone().unwrap_or_default())
}

/// Spinner on stderr while a request is in flight; hidden when piped or
/// quiet.
pub fn spinner(global: &GlobalOpts, message: &'static str) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Status line on stderr, suppressed by `--quiet`.
pub fn note(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}
