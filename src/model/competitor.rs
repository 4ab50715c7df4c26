use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::Event;
use super::social::{self, SocialLinks};

/// One row of the `competitors` table.
///
/// `events`, `benchmark_score` and `last_summary` are derived fields written
/// by the news refresh; everything else comes from the tracker forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub employee_count: Option<i64>,
    #[serde(default)]
    pub headquarters: Option<String>,
    #[serde(default, deserialize_with = "social::lenient")]
    pub social_links: Option<SocialLinks>,
    #[serde(default)]
    pub events: Option<Vec<Event>>,
    #[serde(default)]
    pub benchmark_score: Option<f64>,
    #[serde(default)]
    pub last_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Competitor {
    /// Event log; an absent column reads as empty.
    pub fn events(&self) -> &[Event] {
        self.events.as_deref().unwrap_or_default()
    }

    /// Website host without scheme, `www.` or path.
    pub fn domain(&self) -> Option<String> {
        bare_domain(&self.website)
    }
}

/// Columns written back by the news refresh. The other columns of the row are
/// left as they are; an absent `last_summary` keeps the stored one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedColumns {
    pub id: String,
    pub events: Vec<Event>,
    pub benchmark_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_summary: Option<String>,
}

pub fn bare_domain(website: &str) -> Option<String> {
    let mut s = website.trim();
    for scheme in ["https://", "http://"] {
        if let Some(rest) = s.strip_prefix(scheme) {
            s = rest;
            break;
        }
    }
    s = s.strip_prefix("www.").unwrap_or(s);
    let host = s.split(['/', '?', '#']).next().unwrap_or_default().trim();
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

/// Insert payload built from the add form + company preview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCompetitor {
    pub user_id: String,
    pub name: String,
    pub website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
}

/// Edit-form patch. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(
        default,
        deserialize_with = "social::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub social_links: Option<SocialLinks>,
}

impl CompetitorUpdate {
    pub fn is_empty(&self) -> bool {
        *self == CompetitorUpdate::default()
    }

    pub fn apply(&self, c: &mut Competitor) {
        if let Some(v) = &self.name {
            c.name = v.clone();
        }
        if let Some(v) = &self.website {
            c.website = v.clone();
        }
        if let Some(v) = &self.logo_url {
            c.logo_url = Some(v.clone());
        }
        if let Some(v) = &self.industry {
            c.industry = Some(v.clone());
        }
        if let Some(v) = &self.description {
            c.description = Some(v.clone());
        }
        if let Some(v) = self.founded_year {
            c.founded_year = Some(v);
        }
        if let Some(v) = self.employee_count {
            c.employee_count = Some(v);
        }
        if let Some(v) = &self.headquarters {
            c.headquarters = Some(v.clone());
        }
        if let Some(v) = &self.social_links {
            c.social_links = Some(v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_derived_fields_read_as_empty() {
        let raw = r#"{"id":"c1","user_id":"u1","name":"Acme","website":"acme.io"}"#;
        let c: Competitor = serde_json::from_str(raw).unwrap();
        assert!(c.events().is_empty());
        assert!(c.benchmark_score.is_none());
        assert!(c.social_links.is_none());
    }

    #[test]
    fn malformed_social_links_do_not_fail_the_row() {
        let raw = r#"{"id":"c1","user_id":"u1","name":"Acme","website":"acme.io","social_links":"{oops"}"#;
        let c: Competitor = serde_json::from_str(raw).unwrap();
        assert!(c.social_links.is_none());
    }

    #[test]
    fn bare_domain_strips_scheme_www_and_path() {
        assert_eq!(bare_domain("https://www.PayFlow.tech/about").as_deref(), Some("payflow.tech"));
        assert_eq!(bare_domain("acme.io").as_deref(), Some("acme.io"));
        assert_eq!(bare_domain("  "), None);
    }

    #[test]
    fn update_only_touches_present_fields() {
        let mut c: Competitor =
            serde_json::from_str(r#"{"id":"c1","user_id":"u1","name":"Acme","website":"acme.io","industry":"SaaS"}"#)
                .unwrap();
        let patch = CompetitorUpdate {
            name: Some("Acme Corp".into()),
            ..Default::default()
        };
        patch.apply(&mut c);
        assert_eq!(c.name, "Acme Corp");
        assert_eq!(c.industry.as_deref(), Some("SaaS"));
        assert!(!patch.is_empty());
        assert!(CompetitorUpdate::default().is_empty());
    }
}
