pub mod ai;
pub mod app;
pub mod refresh;

pub use ai::AiConfig;
pub use app::AppConfig;
pub use refresh::{QueryStrategy, RefreshSettings};
