//! Records shared by the store, the refresh job and the API.

pub mod alert;
pub mod competitor;
pub mod event;
pub mod report;
pub mod social;
pub mod trend;

pub use alert::{Alert, AlertType, Priority};
pub use competitor::{bare_domain, Competitor, CompetitorUpdate, DerivedColumns, NewCompetitor};
pub use event::{Event, EventKind, Outcome};
pub use report::{Report, ReportType};
pub use social::SocialLinks;
pub use trend::{NewsArticle, Trend, TrendPoint};

use serde::{Deserialize, Serialize};

/// Identity handed over by the hosted auth provider. Trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}
