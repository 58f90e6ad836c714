//! Stand-in projection for when direct integration is not configured
//!
//! Every operation fails immediately without touching anything, so the
//! synchronizers can call the projection uniformly and let failure
//! containment do the rest.

use async_trait::async_trait;
use chrono::Utc;

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};

use crate::customer::{NewRemoteCustomer, RemoteCustomer, RemoteCustomerId};
use crate::ports::CustomerProjection;

const CAPABILITY: &str = "billing customer projection is not registered";

/// Customer projection that always reports the capability as absent
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableProjection;

impl UnavailableProjection {
    pub fn new() -> Self {
        Self
    }

    fn unavailable() -> PortError {
        PortError::capability_unavailable(CAPABILITY)
    }
}

impl DomainPort for UnavailableProjection {}

#[async_trait]
impl HealthCheckable for UnavailableProjection {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "unavailable-customer-projection".to_string(),
            status: AdapterHealth::Degraded,
            latency_ms: 0,
            message: Some(CAPABILITY.to_string()),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl CustomerProjection for UnavailableProjection {
    async fn create(&self, _customer: NewRemoteCustomer) -> Result<Option<RemoteCustomerId>, PortError> {
        Err(Self::unavailable())
    }

    async fn find_latest_by_email(&self, _email: &str) -> Result<Option<RemoteCustomerId>, PortError> {
        Err(Self::unavailable())
    }

    async fn get(&self, _id: &RemoteCustomerId) -> Result<RemoteCustomer, PortError> {
        Err(Self::unavailable())
    }

    async fn delete(&self, _id: &RemoteCustomerId) -> Result<(), PortError> {
        Err(Self::unavailable())
    }
}
