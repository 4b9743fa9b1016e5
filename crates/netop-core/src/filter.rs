// ── Incident filtering ──
//
// Pure, synchronous predicates over incident records. Criteria are
// AND-composed; an unset criterion passes everything. Results keep the
// input order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Category, Incident, IncidentStatus, Severity};

/// Status criterion: everything, or exactly one status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Only(IncidentStatus),
}

impl StatusFilter {
    pub fn matches(self, status: IncidentStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => write!(f, "{status}"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<IncidentStatus>()
            .map(Self::Only)
            .map_err(|_| CoreError::validation(format!("unknown incident status: {s}")))
    }
}

impl From<IncidentStatus> for StatusFilter {
    fn from(status: IncidentStatus) -> Self {
        Self::Only(status)
    }
}

/// Criteria for narrowing an incident list.
///
/// Doubles as the list query for data sources; see [`IncidentFilter::to_query`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentFilter {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub category: Option<Category>,
    /// Site display name (or site id).
    #[serde(default)]
    pub site: Option<String>,
}

impl IncidentFilter {
    pub fn with_status(mut self, status: impl Into<StatusFilter>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Structured criteria only; search is applied separately.
    pub fn matches(&self, incident: &Incident) -> bool {
        self.status.matches(incident.status)
            && self.severity.is_none_or(|s| s == incident.severity)
            && self.category.is_none_or(|c| incident.category == Some(c))
            && self.site.as_deref().is_none_or(|site| {
                incident.site_label() == site
                    || incident
                        .site_id
                        .as_ref()
                        .is_some_and(|id| id.to_string() == site)
            })
    }

    /// Number of criteria currently narrowing the list, counting a
    /// non-empty search term as one.
    pub fn active_count(&self, search: &str) -> usize {
        [
            self.status != StatusFilter::All,
            self.severity.is_some(),
            self.category.is_some(),
            self.site.is_some(),
            !search.is_empty(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count("") == 0
    }

    /// Query-string pairs for the remote list endpoint. `status=all` is
    /// implied and omitted.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let StatusFilter::Only(status) = self.status {
            query.push(("status", status.to_string()));
        }
        if let Some(severity) = self.severity {
            query.push(("severity", severity.to_string()));
        }
        if let Some(category) = self.category {
            query.push(("category", category.to_string()));
        }
        if let Some(ref site) = self.site {
            query.push(("site", site.clone()));
        }
        query
    }
}

/// Case-insensitive substring match over title, site label and device
/// label. An empty term matches everything.
pub fn matches_search(incident: &Incident, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    [incident.title.as_str(), incident.site_label(), incident.device_label()]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Apply criteria and search, returning references in input order.
pub fn filter<'a>(records: &'a [Incident], criteria: &IncidentFilter, search: &str) -> Vec<&'a Incident> {
    records
        .iter()
        .filter(|incident| criteria.matches(incident) && matches_search(incident, search))
        .collect()
}
