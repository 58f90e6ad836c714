//! Capability Probe
//!
//! Direct integration with the billing system depends on optional database
//! machinery (an extension, a foreign data wrapper, a server, a foreign
//! table). Whether that machinery can be registered is an environment fact
//! this crate probes once at startup and never tries to control.
//!
//! The probe attempts every registration step in order. A failing step is
//! logged and recorded but does not stop later steps; the schema step in
//! particular always runs so the projection has a namespace to fail into.
//! The capability counts as available only if the final projection step
//! succeeded, whatever earlier step caused a failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use core_kernel::{AdapterHealth, HealthCheckResult, PortError};

use crate::adapters::UnavailableProjection;
use crate::ports::CustomerProjection;

/// A single registration step, in probe order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStep {
    /// Enable the integration extension
    EnableExtension,
    /// Register the foreign data wrapper handler
    RegisterHandler,
    /// Register the server bound to the handler
    RegisterServer,
    /// Create the schema the projection lives in
    EnsureSchema,
    /// Register the customer projection bound to the server
    RegisterProjection,
}

impl ProbeStep {
    /// All steps in the order the probe runs them
    pub const ALL: [ProbeStep; 5] = [
        ProbeStep::EnableExtension,
        ProbeStep::RegisterHandler,
        ProbeStep::RegisterServer,
        ProbeStep::EnsureSchema,
        ProbeStep::RegisterProjection,
    ];
}

impl fmt::Display for ProbeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeStep::EnableExtension => "enable extension",
            ProbeStep::RegisterHandler => "register wrapper handler",
            ProbeStep::RegisterServer => "register server",
            ProbeStep::EnsureSchema => "ensure schema",
            ProbeStep::RegisterProjection => "register customer projection",
        };
        f.write_str(name)
    }
}

/// Outcome of one probe step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Failed(String),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

/// Whether direct integration is usable for this process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Available,
    Unavailable,
}

/// Per-step record of a probe run
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub steps: Vec<(ProbeStep, StepOutcome)>,
    pub completed_at: DateTime<Utc>,
}

impl ProbeReport {
    /// Returns the outcome of a step, if it was attempted
    pub fn outcome(&self, step: ProbeStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, outcome)| outcome)
    }

    /// Returns the steps that failed, in probe order
    pub fn failed_steps(&self) -> Vec<ProbeStep> {
        self.steps
            .iter()
            .filter(|(_, outcome)| !outcome.is_success())
            .map(|(step, _)| *step)
            .collect()
    }

    /// The capability this report implies
    pub fn capability(&self) -> Capability {
        match self.outcome(ProbeStep::RegisterProjection) {
            Some(StepOutcome::Succeeded) => Capability::Available,
            _ => Capability::Unavailable,
        }
    }
}

/// Registers the pieces direct integration needs
///
/// Each operation is independently fallible. Implementations must make the
/// steps idempotent, since a restarted process probes again.
#[async_trait]
pub trait CapabilityInstaller: Send + Sync {
    async fn enable_extension(&self) -> Result<(), PortError>;

    async fn register_handler(&self) -> Result<(), PortError>;

    async fn register_server(&self) -> Result<(), PortError>;

    async fn ensure_schema(&self) -> Result<(), PortError>;

    async fn register_projection(&self) -> Result<(), PortError>;

    /// The remote-backed projection, used only if every step succeeded
    fn projection(&self) -> Arc<dyn CustomerProjection>;
}

/// Frozen result of the capability probe
///
/// Carries the projection every synchronizer should use: the remote-backed
/// one when available, [`UnavailableProjection`] otherwise.
#[derive(Clone)]
pub struct CapabilitySnapshot {
    capability: Capability,
    report: ProbeReport,
    projection: Arc<dyn CustomerProjection>,
}

impl CapabilitySnapshot {
    /// Builds a snapshot from a probe report, selecting the projection
    pub fn from_report(report: ProbeReport, remote: Arc<dyn CustomerProjection>) -> Self {
        let capability = report.capability();
        let projection: Arc<dyn CustomerProjection> = match capability {
            Capability::Available => remote,
            Capability::Unavailable => Arc::new(UnavailableProjection::new()),
        };

        Self {
            capability,
            report,
            projection,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn is_available(&self) -> bool {
        self.capability == Capability::Available
    }

    pub fn report(&self) -> &ProbeReport {
        &self.report
    }

    /// The projection selected at probe time
    pub fn projection(&self) -> Arc<dyn CustomerProjection> {
        Arc::clone(&self.projection)
    }

    /// Renders the snapshot as an adapter health result
    pub fn health(&self) -> HealthCheckResult {
        let (status, message) = match self.capability {
            Capability::Available => (AdapterHealth::Healthy, None),
            Capability::Unavailable => {
                let failed: Vec<String> = self
                    .report
                    .failed_steps()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                (
                    AdapterHealth::Degraded,
                    Some(format!(
                        "direct billing integration disabled; failed steps: {}",
                        failed.join(", ")
                    )),
                )
            }
        };

        HealthCheckResult {
            adapter_id: "billing-capability".to_string(),
            status,
            latency_ms: 0,
            message,
            checked_at: self.report.completed_at,
        }
    }
}

impl fmt::Debug for CapabilitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilitySnapshot")
            .field("capability", &self.capability)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

/// Runs the registration steps and records what happened
pub struct CapabilityProbe;

impl CapabilityProbe {
    /// Attempts every step once, in order, containing each failure
    pub async fn run(installer: &dyn CapabilityInstaller) -> CapabilitySnapshot {
        let mut steps = Vec::with_capacity(ProbeStep::ALL.len());

        for step in ProbeStep::ALL {
            let result = match step {
                ProbeStep::EnableExtension => installer.enable_extension().await,
                ProbeStep::RegisterHandler => installer.register_handler().await,
                ProbeStep::RegisterServer => installer.register_server().await,
                ProbeStep::EnsureSchema => installer.ensure_schema().await,
                ProbeStep::RegisterProjection => installer.register_projection().await,
            };

            let outcome = match result {
                Ok(()) => {
                    info!(step = %step, "Billing capability step succeeded");
                    StepOutcome::Succeeded
                }
                Err(e) => {
                    warn!(step = %step, error = %e, "Billing capability step failed");
                    StepOutcome::Failed(e.to_string())
                }
            };
            steps.push((step, outcome));
        }

        let report = ProbeReport {
            steps,
            completed_at: Utc::now(),
        };

        let snapshot = CapabilitySnapshot::from_report(report, installer.projection());
        match snapshot.capability() {
            Capability::Available => info!("Direct billing integration available"),
            Capability::Unavailable => warn!(
                "Direct billing integration unavailable; customer creation falls back to the async handler"
            ),
        }
        snapshot
    }
}

/// Holds the process-wide capability snapshot
///
/// Set once during initialization, read many times afterwards.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    snapshot: OnceCell<Arc<CapabilitySnapshot>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the probe on first call; later calls return the same snapshot
    /// without touching the installer
    pub async fn initialize(&self, installer: &dyn CapabilityInstaller) -> Arc<CapabilitySnapshot> {
        self.snapshot
            .get_or_init(|| async move { Arc::new(CapabilityProbe::run(installer).await) })
            .await
            .clone()
    }

    /// Returns the snapshot, or `None` before initialization
    pub fn snapshot(&self) -> Option<Arc<CapabilitySnapshot>> {
        self.snapshot.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::NewRemoteCustomer;
    use crate::ports::mock::{MockCapabilityInstaller, MockCustomerProjection};

    fn installer() -> MockCapabilityInstaller {
        MockCapabilityInstaller::new(Arc::new(MockCustomerProjection::new()))
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let installer = installer();
        let snapshot = CapabilityProbe::run(&installer).await;

        assert!(snapshot.is_available());
        assert!(snapshot.report().failed_steps().is_empty());
        assert_eq!(installer.attempts().await, ProbeStep::ALL.to_vec());
        assert_eq!(snapshot.health().status, AdapterHealth::Healthy);
    }

    #[tokio::test]
    async fn test_failed_extension_still_attempts_every_step() {
        let installer = installer().failing_step(ProbeStep::EnableExtension);
        let snapshot = CapabilityProbe::run(&installer).await;

        assert_eq!(installer.attempts().await, ProbeStep::ALL.to_vec());
        assert_eq!(snapshot.capability(), Capability::Unavailable);
        assert_eq!(
            snapshot.report().outcome(ProbeStep::EnsureSchema),
            Some(&StepOutcome::Succeeded)
        );
        assert_eq!(
            snapshot.report().failed_steps(),
            vec![ProbeStep::EnableExtension, ProbeStep::RegisterProjection]
        );
    }

    #[tokio::test]
    async fn test_projection_failure_alone_disables_capability() {
        let installer = installer().failing_step(ProbeStep::RegisterProjection);
        let snapshot = CapabilityProbe::run(&installer).await;

        assert!(!snapshot.is_available());
        assert_eq!(snapshot.report().failed_steps(), vec![ProbeStep::RegisterProjection]);
    }

    #[tokio::test]
    async fn test_schema_failure_does_not_disable_capability() {
        let installer = installer().failing_step(ProbeStep::EnsureSchema);
        let snapshot = CapabilityProbe::run(&installer).await;

        assert!(snapshot.is_available());
    }

    #[tokio::test]
    async fn test_unavailable_snapshot_uses_failing_projection() {
        let installer = installer().failing_step(ProbeStep::RegisterServer);
        let snapshot = CapabilityProbe::run(&installer).await;

        let error = snapshot
            .projection()
            .create(NewRemoteCustomer::new(Some("a@x.com".to_string()), "Acme"))
            .await
            .unwrap_err();
        assert!(error.is_capability_unavailable());

        let health = snapshot.health();
        assert_eq!(health.status, AdapterHealth::Degraded);
        assert!(health.message.unwrap().contains("register server"));
    }

    #[tokio::test]
    async fn test_registry_probes_once() {
        let registry = CapabilityRegistry::new();
        assert!(registry.snapshot().is_none());

        let first = installer();
        let snapshot = registry.initialize(&first).await;
        assert!(snapshot.is_available());

        let second = installer().failing_step(ProbeStep::EnableExtension);
        let again = registry.initialize(&second).await;

        assert!(again.is_available());
        assert!(second.attempts().await.is_empty());
        assert!(registry.snapshot().is_some());
    }

    #[test]
    fn test_report_serializes_step_outcomes() {
        let report = ProbeReport {
            steps: vec![
                (ProbeStep::EnableExtension, StepOutcome::Succeeded),
                (ProbeStep::RegisterHandler, StepOutcome::Failed("boom".to_string())),
            ],
            completed_at: Utc::now(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["steps"][0][0], "enable_extension");
        assert_eq!(json["steps"][0][1]["status"], "succeeded");
        assert_eq!(json["steps"][1][1]["error"], "boom");
    }
}
