//! Readiness report types.

use serde::Serialize;

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"loading"`, `"ready"`, or `"failed"`.
    pub status: &'static str,
    /// Number of modules in the graph, once ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<usize>,
    /// Startup failure message, if loading failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
