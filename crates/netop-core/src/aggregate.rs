// ── Grouped counts ──

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::model::{Incident, Severity};

/// A grouping key. Records without a value for the key land in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bucket<K> {
    Key(K),
    Unknown,
}

impl<K: fmt::Display> fmt::Display for Bucket<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => k.fmt(f),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl<K: fmt::Display> Serialize for Bucket<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Count records per key, in first-seen key order.
pub fn count_by<'a, T, K, F>(records: impl IntoIterator<Item = &'a T>, key: F) -> IndexMap<Bucket<K>, usize>
where
    T: 'a,
    K: Eq + Hash,
    F: Fn(&T) -> Option<K>,
{
    let mut counts = IndexMap::new();
    for record in records {
        let bucket = key(record).map_or(Bucket::Unknown, Bucket::Key);
        *counts.entry(bucket).or_insert(0) += 1;
    }
    counts
}

/// Incident fields available for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IncidentField {
    Status,
    Severity,
    Category,
    Site,
}

/// Count incidents by one field, keyed by the field's string form.
pub fn count_incidents_by(records: &[Incident], field: IncidentField) -> IndexMap<Bucket<String>, usize> {
    count_by(records, |incident: &Incident| match field {
        IncidentField::Status => Some(incident.status.to_string()),
        IncidentField::Severity => Some(incident.severity.to_string()),
        IncidentField::Category => incident.category.map(|c| c.to_string()),
        IncidentField::Site => incident.site_name.as_deref().map(str::to_owned),
    })
}

/// Per-severity counts, all four severities present (most urgent first),
/// zero-filled.
pub fn severity_breakdown<'a>(records: impl IntoIterator<Item = &'a Incident>) -> IndexMap<Severity, usize> {
    let mut counts: IndexMap<Severity, usize> = Severity::ALL.iter().map(|s| (*s, 0)).collect();
    for incident in records {
        *counts.entry(incident.severity).or_insert(0) += 1;
    }
    counts
}

/// Sum of all bucket counts.
pub fn total<K>(counts: &IndexMap<K, usize>) -> usize {
    counts.values().sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Category, DisplayName, EntityId, IncidentStatus};

    fn incident(severity: Severity, category: Option<Category>, site: Option<&str>) -> Incident {
        Incident {
            id: EntityId::generate(),
            title: "x".into(),
            description: String::new(),
            severity,
            status: IncidentStatus::Open,
            category,
            site_id: None,
            device_id: None,
            site_name: DisplayName::from(site.map(str::to_owned)),
            device_name: DisplayName::Unresolved,
            detected_at: Utc::now(),
            resolved_at: None,
            insight: None,
            reviewed: false,
            reviewed_at: None,
        }
    }

    #[test]
    fn empty_input_totals_zero() {
        let counts = count_incidents_by(&[], IncidentField::Severity);
        assert!(counts.is_empty());
        assert_eq!(total(&counts), 0);
        let breakdown = severity_breakdown(std::iter::empty());
        assert_eq!(total(&breakdown), 0);
        assert_eq!(breakdown.len(), 4);
    }

    #[test]
    fn missing_values_go_to_unknown_bucket() {
        let records = vec![
            incident(Severity::High, Some(Category::Operational), Some("HQ")),
            incident(Severity::High, None, None),
            incident(Severity::Low, Some(Category::Operational), Some("HQ")),
        ];
        let by_category = count_incidents_by(&records, IncidentField::Category);
        assert_eq!(by_category[&Bucket::Key("operational".to_owned())], 2);
        assert_eq!(by_category[&Bucket::Unknown], 1);
        assert_eq!(total(&by_category), records.len());

        let by_site = count_incidents_by(&records, IncidentField::Site);
        let keys: Vec<String> = by_site.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["HQ", "unknown"]);
    }

    #[test]
    fn breakdown_is_zero_filled_and_ordered() {
        let records = vec![incident(Severity::Medium, None, None)];
        let breakdown = severity_breakdown(&records);
        let entries: Vec<(Severity, usize)> = breakdown.into_iter().collect();
        assert_eq!(
            entries,
            vec![
                (Severity::Critical, 0),
                (Severity::High, 0),
                (Severity::Medium, 1),
                (Severity::Low, 0),
            ]
        );
    }

    #[test]
    fn generic_count_by_closure() {
        let words = ["apple", "avocado", "banana", ""];
        let counts = count_by(&words, |w: &&str| w.chars().next());
        assert_eq!(counts[&Bucket::Key('a')], 2);
        assert_eq!(counts[&Bucket::Unknown], 1);
    }
}
