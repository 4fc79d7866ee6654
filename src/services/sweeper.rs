//! Scheduled lifecycle sweeper
//!
//! Promotes reservations along approved -> active -> completed on daily
//! wall-clock triggers and reports overdue maintenance. Every sweep gathers
//! its candidates first, then handles each one on its own: a failing item is
//! logged and skipped.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use tokio::task::JoinHandle;

use super::{maintenance::MaintenanceService, reservations::ReservationsService};
use crate::{
    clock::{day_bounds, Clock},
    config::SchedulerConfig,
    error::{AppError, AppResult},
    models::Maintenance,
    repository::Stores,
};

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub examined: usize,
    pub transitioned: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Activation,
    Completion,
    MaintenanceScan,
}

#[derive(Clone)]
pub struct Sweeper {
    stores: Stores,
    reservations: ReservationsService,
    maintenance: MaintenanceService,
    clock: Arc<dyn Clock>,
}

impl Sweeper {
    pub fn new(
        stores: Stores,
        reservations: ReservationsService,
        maintenance: MaintenanceService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            stores,
            reservations,
            maintenance,
            clock,
        }
    }

    /// Activate approved reservations starting today
    pub async fn activate_due(&self) -> AppResult<SweepReport> {
        let (today, tomorrow) = day_bounds(self.clock.now());
        let due = self
            .stores
            .reservations
            .find_approved_starting(today, tomorrow)
            .await?;

        let mut report = SweepReport {
            examined: due.len(),
            ..Default::default()
        };
        for reservation in due {
            match self.reservations.activate(reservation.id).await {
                Ok(_) => report.transitioned += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        "Activation of reservation {} (equipment {}) failed: {}",
                        reservation.id,
                        reservation.equipment_id,
                        e
                    );
                }
            }
        }

        tracing::info!("Activation sweep: {:?}", report);
        Ok(report)
    }

    /// Complete active reservations ending today or earlier
    pub async fn complete_due(&self) -> AppResult<SweepReport> {
        let (_, tomorrow) = day_bounds(self.clock.now());
        let due = self
            .stores
            .reservations
            .find_active_ending_before(tomorrow)
            .await?;

        let mut report = SweepReport {
            examined: due.len(),
            ..Default::default()
        };
        for reservation in due {
            match self.reservations.complete(reservation.id).await {
                Ok(_) => report.transitioned += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        "Completion of reservation {} (equipment {}) failed: {}",
                        reservation.id,
                        reservation.equipment_id,
                        e
                    );
                }
            }
        }

        tracing::info!("Completion sweep: {:?}", report);
        Ok(report)
    }

    /// Report scheduled maintenance whose date has passed
    pub async fn scan_overdue_maintenance(&self) -> AppResult<Vec<Maintenance>> {
        let overdue = self.maintenance.overdue().await?;
        for maintenance in &overdue {
            tracing::warn!(
                "Maintenance {} on equipment {} overdue since {} ({})",
                maintenance.id,
                maintenance.equipment_id,
                maintenance.scheduled_date,
                maintenance.priority
            );
        }
        tracing::info!("Maintenance scan: {} overdue", overdue.len());
        Ok(overdue)
    }

    async fn run_job(&self, job: Job) {
        let result = match job {
            Job::Activation => self.activate_due().await.map(|_| ()),
            Job::Completion => self.complete_due().await.map(|_| ()),
            Job::MaintenanceScan => self.scan_overdue_maintenance().await.map(|_| ()),
        };
        if let Err(e) = result {
            tracing::error!("{:?} sweep failed: {}", job, e);
        }
    }

    /// Run the sweeps forever at their configured times of day (UTC)
    pub fn spawn(self, config: &SchedulerConfig) -> AppResult<JoinHandle<()>> {
        let invalid = |e: ::config::ConfigError| AppError::Internal(e.to_string());
        let triggers = [
            (Job::Activation, config.activation_at().map_err(invalid)?),
            (Job::Completion, config.completion_at().map_err(invalid)?),
            (Job::MaintenanceScan, config.maintenance_scan_at().map_err(invalid)?),
        ];

        Ok(tokio::spawn(async move {
            tracing::info!(
                "Lifecycle sweeper started (activation {}, completion {}, maintenance scan {})",
                triggers[0].1,
                triggers[1].1,
                triggers[2].1
            );
            loop {
                let now = self.clock.now();
                let (job, at) = next_trigger(now, &triggers);
                let wait = (at - now).to_std().unwrap_or_default();
                tracing::debug!("Next sweep {:?} at {}", job, at);
                tokio::time::sleep(wait).await;
                self.run_job(job).await;
            }
        }))
    }
}

/// Earliest upcoming trigger strictly after `now`
fn next_trigger(now: DateTime<Utc>, triggers: &[(Job, NaiveTime)]) -> (Job, DateTime<Utc>) {
    let (today, _) = day_bounds(now);
    let mut next: Option<(Job, DateTime<Utc>)> = None;
    for (job, time) in triggers {
        let mut at = today.date_naive().and_time(*time).and_utc();
        if at <= now {
            at += Duration::days(1);
        }
        if next.map_or(true, |(_, best)| at < best) {
            next = Some((*job, at));
        }
    }
    next.unwrap_or((Job::MaintenanceScan, now + Duration::days(1)))
}
