/*
 *  view.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	View state aggregate and its reducer
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
use log::debug;
use rand::Rng;
use std::sync::Arc;

use crate::clock::{LocalClock, display_lines};
use crate::clouds::{self, CloudField};
use crate::effects::SceneEffects;
use crate::temperature::{StyleBucket, classify};
use crate::weather::WeatherSnapshot;

/// A snapshot together with everything derived from it. Built in one go so
/// the style, clouds and effects always belong to the same payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotView {
    pub snapshot: WeatherSnapshot,
    pub style: Option<&'static StyleBucket>,
    pub clouds: Option<CloudField>,
    pub effects: Option<SceneEffects>,
}

impl SnapshotView {
    pub fn derive(snapshot: WeatherSnapshot) -> Self {
        Self::derive_with(snapshot, &mut rand::rng())
    }

    pub fn derive_with<R: Rng>(snapshot: WeatherSnapshot, rng: &mut R) -> Self {
        let style = snapshot.temp_c().map(classify);
        let clouds = snapshot.cloud().map(|c| clouds::generate_with(c, rng));
        let effects = SceneEffects::from_snapshot(&snapshot);
        Self { snapshot, style, clouds, effects }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// User asked for a location; `request` identifies the fetch it starts.
    Submit { request: u64, query: String },
    FetchSucceeded { request: u64, view: SnapshotView },
    FetchFailed { request: u64, reason: String },
    /// Clock reading for `zone`.
    Tick { zone: String, clock: LocalClock },
}

/// Everything the renderer reads. Replaced, never edited, by `reduce`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub loading: bool,
    pub query: String,
    /// Request whose result is still awaited.
    pub pending: Option<u64>,
    pub current: Option<Arc<SnapshotView>>,
    pub clock: Option<LocalClock>,
}

impl ViewState {
    pub fn reduce(self, event: ViewEvent) -> ViewState {
        match event {
            ViewEvent::Submit { request, query } => ViewState {
                loading: true,
                query,
                pending: Some(request),
                ..self
            },
            ViewEvent::FetchSucceeded { request, view } => {
                if self.pending != Some(request) {
                    debug!("Dropping stale result for request {}", request);
                    return self;
                }
                ViewState {
                    loading: false,
                    pending: None,
                    current: Some(Arc::new(view)),
                    // the old zone's reading must not outlive its snapshot
                    clock: None,
                    ..self
                }
            }
            ViewEvent::FetchFailed { request, reason } => {
                if self.pending != Some(request) {
                    debug!("Dropping stale failure for request {}: {}", request, reason);
                    return self;
                }
                ViewState { loading: false, pending: None, ..self }
            }
            ViewEvent::Tick { zone, clock } => {
                if self.clock_zone() != Some(zone.as_str()) {
                    return self;
                }
                ViewState { clock: Some(clock), ..self }
            }
        }
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.current.as_deref().map(|v| &v.snapshot)
    }

    /// Zone the clock should run in, if the snapshot supports a live clock.
    pub fn clock_zone(&self) -> Option<&str> {
        self.snapshot().and_then(|s| s.clock_zone())
    }

    /// Card shows once a snapshot with a temperature is in.
    pub fn card_visible(&self) -> bool {
        !self.loading && self.current.as_ref().is_some_and(|v| v.style.is_some())
    }

    pub fn clock_lines(&self) -> (String, String) {
        let localtime = self.snapshot().and_then(|s| s.location.localtime.as_deref());
        display_lines(self.clock.as_ref(), localtime)
    }
}
