/*
 *  clock.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	Local time for the snapshot's timezone, ticked once a second
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("Unknown timezone: {0}")]
    UnknownZone(String),
}

/// Source of "now". Swappable so the ticker can run against a fake clock.
pub trait WallClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl WallClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Timezone aware wall time, already formatted for the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalClock {
    pub date: String,
    pub time: String,
}

impl LocalClock {
    pub fn compute(zone: Tz, now: DateTime<Utc>) -> Self {
        let local = now.with_timezone(&zone);
        Self {
            date: local.format("%Y-%m-%d").to_string(),
            time: local.format("%H:%M:%S").to_string(),
        }
    }
}

pub fn parse_zone(tz_id: &str) -> Result<Tz, ClockError> {
    tz_id
        .trim()
        .parse::<Tz>()
        .map_err(|_| ClockError::UnknownZone(tz_id.to_string()))
}

/// Date and time lines for the card. Without a zoned clock both lines show
/// the API's `localtime` verbatim.
pub fn display_lines(clock: Option<&LocalClock>, localtime: Option<&str>) -> (String, String) {
    match clock {
        Some(c) => (c.date.clone(), c.time.clone()),
        None => {
            let raw = localtime.unwrap_or_default().to_string();
            (raw.clone(), raw)
        }
    }
}

/// Periodic task recomputing the local clock for one zone.
///
/// Owning the ticker owns the interval: dropping it stops the task, so a
/// replaced ticker can never keep firing next to its successor.
#[derive(Debug)]
pub struct ClockTicker {
    zone: Tz,
    rx: watch::Receiver<Option<LocalClock>>,
    stop_sender: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ClockTicker {
    /// Spawns the tick task. The first tick fires immediately.
    pub fn start(tz_id: &str, period: Duration, source: Arc<dyn WallClock>) -> Result<Self, ClockError> {
        let zone = parse_zone(tz_id)?;
        let (tx, rx) = watch::channel(None);
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let clock = LocalClock::compute(zone, source.now());
                        if tx.send(Some(clock)).is_err() {
                            debug!("Clock for {} has no readers. Exiting.", zone);
                            break;
                        }
                    }
                    _ = stop_rx.recv() => {
                        debug!("Clock for {} received stop signal. Exiting.", zone);
                        break;
                    }
                }
            }
        });

        info!("Clock started for {}", zone);
        Ok(Self {
            zone,
            rx,
            stop_sender: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Most recent reading, `None` before the first tick.
    pub fn latest(&self) -> Option<LocalClock> {
        self.rx.borrow().clone()
    }

    /// Waits for the next reading. `None` once the task has ended.
    pub async fn changed(&mut self) -> Option<LocalClock> {
        match self.rx.changed().await {
            Ok(()) => self.rx.borrow_and_update().clone(),
            Err(_) => None,
        }
    }

    /// Stops the task and waits for it to finish.
    pub async fn stop(mut self) {
        if let Some(sender) = self.stop_sender.take() {
            if let Err(e) = sender.send(()).await {
                error!("Failed to send stop signal to clock task: {}", e);
            }
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .unwrap_or_else(|e| error!("Clock task failed to join: {}", e));
        }
        info!("Clock stopped for {}", self.zone);
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        if let Some(sender) = self.stop_sender.take() {
            let _ = sender.try_send(());
        }
        // Drop can't await the join
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Clock dropped for {}", self.zone);
        }
    }
}
