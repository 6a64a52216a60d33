//! Readiness waiting for workloads and setup jobs
//!
//! Waiting blocks the invoking task until the platform reports the desired
//! state or the configured timeout passes; the timeout is the only
//! abandonment mechanism. The production waiter polls the platform; the
//! immediate waiter is the swappable test double.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::client::PlatformClient;
use crate::deployment::Workload;
use crate::error::{KubeError, Result};
use crate::job::{SETUP_JOB_NAME, SetupJob};

/// Waiting window applied when a probe leaves its timeout unset
const DEFAULT_TIMEOUT_SECONDS: i64 = 300;

/// Blocking readiness capability.
///
/// Two independent instances are used per cluster, one for the long-running
/// workloads and one for the setup job, since their period/timeout sources
/// differ.
#[async_trait]
pub trait Readiness: Send + Sync {
    /// Wait until every probed workload reports its desired replicas
    /// available. Workloads without a probe are immediately ready and are
    /// not polled.
    async fn wait_for_completion(
        &self,
        client: &dyn PlatformClient,
        workloads: &[Workload],
    ) -> Result<()>;

    /// Wait until the setup job reports at least one completion.
    async fn wait_for_job_completion(
        &self,
        client: &dyn PlatformClient,
        job: &SetupJob,
    ) -> Result<()>;
}

/// Production waiter polling the platform at each probe's period.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollingReadiness;

impl PollingReadiness {
    pub fn new() -> Self {
        Self
    }

    fn deadline(timeout_seconds: u32) -> DateTime<Utc> {
        let window = if timeout_seconds == 0 {
            Duration::seconds(DEFAULT_TIMEOUT_SECONDS)
        } else {
            Duration::seconds(i64::from(timeout_seconds))
        };
        Utc::now() + window
    }

    /// Sleep one polling period, clamped so the wait never overshoots the
    /// deadline. Returns false once the deadline has passed.
    async fn sleep_until_next_poll(period_seconds: u32, deadline: DateTime<Utc>) -> bool {
        let remaining = deadline - Utc::now();
        if remaining <= Duration::zero() {
            return false;
        }
        let period = Duration::seconds(i64::from(period_seconds.max(1)));
        let sleep = period.min(remaining).to_std().unwrap_or_default();
        tokio::time::sleep(sleep).await;
        true
    }
}

#[async_trait]
impl Readiness for PollingReadiness {
    async fn wait_for_completion(
        &self,
        client: &dyn PlatformClient,
        workloads: &[Workload],
    ) -> Result<()> {
        for workload in workloads {
            let Some(probe) = &workload.probe else {
                continue;
            };

            let namespace = workload.namespace();
            let deadline = Self::deadline(probe.timeout_seconds);

            loop {
                let deployment = client.get_deployment(&namespace, &workload.name).await?;
                let desired = deployment
                    .spec
                    .as_ref()
                    .and_then(|s| s.replicas)
                    .unwrap_or(1);
                let available = deployment
                    .status
                    .as_ref()
                    .and_then(|s| s.available_replicas)
                    .unwrap_or(0);
                if available >= desired {
                    break;
                }

                if !Self::sleep_until_next_poll(probe.period_seconds, deadline).await {
                    return Err(KubeError::ReadinessTimeout {
                        name: workload.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn wait_for_job_completion(
        &self,
        client: &dyn PlatformClient,
        job: &SetupJob,
    ) -> Result<()> {
        let namespace = job.namespace();
        let deadline = Self::deadline(job.timeout_seconds);

        loop {
            let stored = client.get_job(&namespace, SETUP_JOB_NAME).await?;
            let succeeded = stored
                .status
                .as_ref()
                .and_then(|s| s.succeeded)
                .unwrap_or(0);
            if succeeded >= 1 {
                return Ok(());
            }

            if !Self::sleep_until_next_poll(job.period_seconds, deadline).await {
                return Err(KubeError::ReadinessTimeout {
                    name: SETUP_JOB_NAME.to_string(),
                });
            }
        }
    }
}

/// Test double reporting everything ready without touching the platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateReadiness;

#[async_trait]
impl Readiness for ImmediateReadiness {
    async fn wait_for_completion(
        &self,
        _client: &dyn PlatformClient,
        _workloads: &[Workload],
    ) -> Result<()> {
        Ok(())
    }

    async fn wait_for_job_completion(
        &self,
        _client: &dyn PlatformClient,
        _job: &SetupJob,
    ) -> Result<()> {
        Ok(())
    }
}
