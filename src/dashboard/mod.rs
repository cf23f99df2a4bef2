//! Stub contract behind the dashboard REST API

pub mod models;
pub mod source;

pub use models::{AnalysisRequest, DashboardData, ScoreMetric, TrendingTopic};
pub use source::{DashboardSource, RandomDashboardSource};
