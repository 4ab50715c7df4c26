use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Comprehensive,
    Funding,
    Trends,
    Competitive,
}

impl ReportType {
    pub fn label(self) -> &'static str {
        match self {
            ReportType::Comprehensive => "Comprehensive Intelligence Report",
            ReportType::Funding => "Funding Overview",
            ReportType::Trends => "Market Trends Analysis",
            ReportType::Competitive => "Competitive Landscape",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub title: String,
    pub summary: String,
    #[serde(rename = "dateGenerated", alias = "date_generated")]
    pub date_generated: NaiveDate,
    #[serde(rename = "type")]
    pub kind: ReportType,
}
