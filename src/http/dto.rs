use serde::{Deserialize, Serialize};

use crate::models::{Class, Lesson, SchoolConfig};

fn default_allow_relaxation() -> bool {
    true
}

fn default_max_time_limit() -> u64 {
    180
}

/// Body of `POST /solve` and `POST /start-solve`. `schoolConfig` accepts the
/// alias `config`, matching the field-alias requirement on the external
/// interface.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverRequest {
    pub lessons: Vec<Lesson>,
    pub classes: Vec<Class>,
    #[serde(alias = "config")]
    pub school_config: SchoolConfig,
    #[serde(default = "default_allow_relaxation")]
    pub allow_relaxation: bool,
    #[serde(default = "default_max_time_limit")]
    pub max_time_limit: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSolveResponse {
    pub job_id: String,
    pub status: &'static str,
    pub message: String,
}
