//! Background purge of expired mappings
//!
//! The sweeper wakes on its schedule, calls
//! [`UrlService::purge_expired`] and logs the outcome. Failures are
//! logged and swallowed so the next run proceeds independently.

use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::service::UrlService;

/// Midnight is looked up this far ahead of the wall clock, so a timer that
/// fires slightly early does not schedule a second run for the same night.
const MIDNIGHT_SLACK_SECS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepSchedule {
    /// Once per calendar day at 00:00 in the server's local time zone
    DailyAtLocalMidnight,
    /// Fixed period, first run one period after start
    Every(Duration),
}

impl SweepSchedule {
    /// Time to wait from `now` until the next run.
    pub fn next_delay<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        match self {
            Self::DailyAtLocalMidnight => {
                let lookup_from = now.clone() + chrono::Duration::seconds(MIDNIGHT_SLACK_SECS);
                next_midnight(&lookup_from)
                    .signed_duration_since(now)
                    .to_std()
                    .unwrap_or(Duration::ZERO)
            }
            Self::Every(period) => *period,
        }
    }
}

/// First midnight strictly after `now` in `now`'s time zone.
///
/// When a DST transition skips local midnight, the earliest valid instant
/// within the following two hours is used instead.
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return now.clone() + chrono::Duration::days(1);
    };
    let midnight = tomorrow.and_time(NaiveTime::MIN);

    (0..=4)
        .map(|step| midnight + chrono::Duration::minutes(30 * step))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .unwrap_or_else(|| now.clone() + chrono::Duration::days(1))
}

/// Runs one purge and logs the result. Returns the removed count on success.
pub async fn sweep_once(service: &UrlService, now: DateTime<Utc>) -> Option<u64> {
    match service.purge_expired(now).await {
        Ok(removed) => {
            tracing::info!(removed, "expired short urls purged");
            Some(removed)
        }
        Err(err) => {
            tracing::error!(error = %err, "expiry sweep failed");
            None
        }
    }
}

pub struct Sweeper {
    service: UrlService,
    schedule: SweepSchedule,
}

impl Sweeper {
    pub fn new(service: UrlService, schedule: SweepSchedule) -> Self {
        Self { service, schedule }
    }

    /// Starts the periodic task on the current tokio runtime.
    ///
    /// Dropping the returned handle without calling [`SweeperHandle::stop`]
    /// also ends the task at its next wake-up check.
    pub fn spawn(self) -> SweeperHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            tracing::info!(schedule = ?self.schedule, "expiry sweeper started");
            loop {
                let delay = self.schedule.next_delay(&Local::now());
                tracing::debug!(?delay, "next expiry sweep scheduled");

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        sweep_once(&self.service, Utc::now()).await;
                    }
                    _ = stop_rx.changed() => break,
                }
            }
            tracing::info!("expiry sweeper stopped");
        });

        SweeperHandle { stop_tx, task }
    }
}

pub struct SweeperHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the task to stop and waits for it. A sweep already in
    /// progress is allowed to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(err) = self.task.await {
            tracing::error!(error = %err, "expiry sweeper task ended abnormally");
        }
    }
}
