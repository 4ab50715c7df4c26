//! Alerts feed filtering and read tracking.
//!
//! Filters are sets of accepted values per field. An empty set imposes no
//! constraint; non-empty sets are intersected.

use std::collections::{BTreeSet, HashSet};

use crate::model::{Alert, AlertType, Priority};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertFilter {
    pub types: BTreeSet<AlertType>,
    pub priorities: BTreeSet<Priority>,
    pub competitors: BTreeSet<String>,
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, v: T) {
    if !set.remove(&v) {
        set.insert(v);
    }
}

/// Splits `a,b, c` into trimmed non-empty parts.
fn csv(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl AlertFilter {
    /// Builds a filter from comma-separated query values.
    pub fn from_query(
        types: Option<&str>,
        priorities: Option<&str>,
        competitors: Option<&str>,
    ) -> Result<Self, String> {
        Ok(Self {
            types: csv(types)
                .map(str::parse::<AlertType>)
                .collect::<Result<_, _>>()?,
            priorities: csv(priorities)
                .map(str::parse::<Priority>)
                .collect::<Result<_, _>>()?,
            competitors: csv(competitors).map(str::to_string).collect(),
        })
    }

    pub fn toggle_type(&mut self, t: AlertType) {
        toggle(&mut self.types, t);
    }

    pub fn toggle_priority(&mut self, p: Priority) {
        toggle(&mut self.priorities, p);
    }

    pub fn toggle_competitor(&mut self, name: &str) {
        toggle(&mut self.competitors, name.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.priorities.is_empty() && self.competitors.is_empty()
    }

    pub fn matches(&self, a: &Alert) -> bool {
        let type_ok = self.types.is_empty() || self.types.contains(&a.kind);
        let prio_ok = self.priorities.is_empty() || self.priorities.contains(&a.priority);
        let comp_ok = self.competitors.is_empty()
            || a
                .competitor
                .as_ref()
                .is_some_and(|c| self.competitors.contains(c));
        type_ok && prio_ok && comp_ok
    }

    pub fn apply(&self, alerts: &[Alert]) -> Vec<Alert> {
        alerts.iter().filter(|a| self.matches(a)).cloned().collect()
    }
}

/// Distinct non-null competitor names, in feed order.
pub fn competitor_names(alerts: &[Alert]) -> Vec<String> {
    let mut seen = HashSet::new();
    alerts
        .iter()
        .filter_map(|a| a.competitor.clone())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ReadState {
    read: HashSet<String>,
}

impl ReadState {
    /// Returns false when the alert was already read.
    pub fn mark_read(&mut self, id: &str) -> bool {
        self.read.insert(id.to_string())
    }

    /// Marks every visible alert read; earlier reads are kept.
    pub fn mark_all_read(&mut self, visible: &[Alert]) {
        self.read.extend(visible.iter().map(|a| a.id.clone()));
    }

    pub fn is_read(&self, id: &str) -> bool {
        self.read.contains(id)
    }

    pub fn unread_count(&self, visible: &[Alert]) -> usize {
        visible.iter().filter(|a| !self.is_read(&a.id)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_clears() {
        let mut f = AlertFilter::default();
        f.toggle_type(AlertType::Funding);
        assert!(f.types.contains(&AlertType::Funding));
        f.toggle_type(AlertType::Funding);
        assert!(f.is_empty());
    }

    #[test]
    fn query_parsing_rejects_unknown_values() {
        let f = AlertFilter::from_query(Some("funding, market"), Some("high"), None).unwrap();
        assert_eq!(f.types.len(), 2);
        assert_eq!(f.priorities.len(), 1);
        assert!(AlertFilter::from_query(Some("gossip"), None, None).is_err());
    }
}
