use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Funding,
    Product,
    Regulation,
    Executive,
    Market,
}

impl FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "funding" => Ok(AlertType::Funding),
            "product" => Ok(AlertType::Product),
            "regulation" => Ok(AlertType::Regulation),
            "executive" => Ok(AlertType::Executive),
            "market" => Ok(AlertType::Market),
            other => Err(format!("unknown alert type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertType,
    pub title: String,
    pub description: String,
    /// Display string as shipped by the feed ("2 hours ago").
    pub timestamp: String,
    pub priority: Priority,
    #[serde(default)]
    pub competitor: Option<String>,
}
