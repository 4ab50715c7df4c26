//! Event analysis: classification, benchmark score, LLM summaries.

pub mod benchmark;
pub mod classify;
pub mod summarizer;

pub use benchmark::benchmark_score;
pub use classify::Classifier;
pub use summarizer::{build_summarizer, DynSummarizer, MockSummarizer, Summarizer};
