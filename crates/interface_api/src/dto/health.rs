//! Health DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use core_kernel::AdapterHealth;
use domain_customer::{Capability, CapabilitySnapshot, ProbeStep, StepOutcome};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of `GET /health/billing`
#[derive(Debug, Serialize)]
pub struct BillingHealthResponse {
    pub capability: Capability,
    pub status: AdapterHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub probed_at: DateTime<Utc>,
    pub steps: Vec<ProbeStepResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProbeStepResponse {
    pub step: ProbeStep,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

impl From<&CapabilitySnapshot> for BillingHealthResponse {
    fn from(snapshot: &CapabilitySnapshot) -> Self {
        let health = snapshot.health();
        Self {
            capability: snapshot.capability(),
            status: health.status,
            message: health.message,
            probed_at: snapshot.report().completed_at,
            steps: snapshot
                .report()
                .steps
                .iter()
                .map(|(step, outcome)| ProbeStepResponse {
                    step: *step,
                    outcome: outcome.clone(),
                })
                .collect(),
        }
    }
}
