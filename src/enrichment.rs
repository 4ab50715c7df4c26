//! Company preview shown while adding a competitor.

use serde::Serialize;

use crate::config::app::DEFAULT_LOGO_BASE_URL;
use crate::model::{bare_domain, SocialLinks};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyPreview {
    pub name: String,
    pub logo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(skip_serializing_if = "SocialLinks::is_empty")]
    pub social_links: SocialLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompanyPreview {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Capitalized first domain label: `payflow.io` → `Payflow`.
fn display_name(domain: &str) -> String {
    let label = domain.split('.').next().unwrap_or_default();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds a preview from the website alone. The logo URL follows the lookup
/// endpoint's convention and is not fetched.
pub fn company_preview(website: &str, logo_base_url: &str) -> CompanyPreview {
    let Some(domain) = bare_domain(website) else {
        return CompanyPreview {
            error: Some("Failed to fetch company info".to_string()),
            ..Default::default()
        };
    };
    let base = if logo_base_url.trim().is_empty() {
        DEFAULT_LOGO_BASE_URL
    } else {
        logo_base_url.trim_end_matches('/')
    };
    CompanyPreview {
        name: display_name(&domain),
        logo: format!("{base}/{domain}"),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_and_www() {
        let p = company_preview("https://www.payflow.io/pricing", "https://logo.clearbit.com/");
        assert!(p.is_ok());
        assert_eq!(p.name, "Payflow");
        assert_eq!(p.logo, "https://logo.clearbit.com/payflow.io");
    }

    #[test]
    fn bare_host_and_custom_base() {
        let p = company_preview("creditflow.com", "http://logos.local");
        assert_eq!(p.name, "Creditflow");
        assert_eq!(p.logo, "http://logos.local/creditflow.com");
    }

    #[test]
    fn empty_input_carries_error() {
        let p = company_preview("   ", DEFAULT_LOGO_BASE_URL);
        assert!(!p.is_ok());
        assert!(p.name.is_empty());
    }
}
