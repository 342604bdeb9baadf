/*
 *  app.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	View controller: fetches, clock ticker and user input feed the reducer
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
use log::{debug, error, info, warn};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinError, JoinHandle};

use crate::clock::{ClockTicker, LocalClock, WallClock};
use crate::config::Config;
use crate::render::Renderer;
use crate::view::{SnapshotView, ViewEvent, ViewState};
use crate::weather::{WeatherApiError, WeatherSnapshot, WeatherSource};

/// Typed at the prompt to end the session.
pub const QUIT_COMMAND: &str = ":q";

type FetchOutcome = (u64, Result<WeatherSnapshot, WeatherApiError>);

/// Owns the view state and every resource that writes into it.
pub struct App<S> {
    source: Arc<S>,
    config: Config,
    wall: Arc<dyn WallClock>,
    state: ViewState,
    next_request: u64,
    pending: Option<JoinHandle<FetchOutcome>>,
    ticker: Option<ClockTicker>,
    /// Zone id as the snapshot spelled it, for tagging ticks.
    ticker_zone: Option<String>,
}

impl<S> App<S>
where
    S: WeatherSource + Send + Sync + 'static,
{
    pub fn new(source: S, config: Config, wall: Arc<dyn WallClock>) -> Self {
        Self {
            source: Arc::new(source),
            config,
            wall,
            state: ViewState::default(),
            next_request: 0,
            pending: None,
            ticker: None,
            ticker_zone: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn clock_running(&self) -> bool {
        self.ticker.is_some()
    }

    fn dispatch(&mut self, event: ViewEvent) {
        let restart_clock = matches!(event, ViewEvent::FetchSucceeded { .. });
        let before = self.state.current.clone();
        self.state = std::mem::take(&mut self.state).reduce(event);

        let replaced = match (&before, &self.state.current) {
            (Some(a), Some(b)) => !Arc::ptr_eq(a, b),
            (None, Some(_)) => true,
            _ => false,
        };
        if restart_clock && replaced {
            self.restart_clock();
        }
    }

    /// Tears down the running ticker before starting one for the new snapshot.
    fn restart_clock(&mut self) {
        if let Some(old) = self.ticker.take() {
            debug!("Replacing clock for {}", old.zone());
            drop(old);
        }
        self.ticker_zone = None;
        let Some(zone) = self.state.clock_zone().map(str::to_string) else {
            info!("No timezone in snapshot, showing reported local time");
            return;
        };
        let period = Duration::from_millis(self.config.clock.tick_ms);
        match ClockTicker::start(&zone, period, Arc::clone(&self.wall)) {
            Ok(ticker) => {
                self.ticker = Some(ticker);
                self.ticker_zone = Some(zone);
            }
            Err(e) => warn!("{}; showing reported local time", e),
        }
    }

    fn begin(&mut self, query: &str) -> u64 {
        self.next_request += 1;
        let request = self.next_request;
        self.dispatch(ViewEvent::Submit { request, query: query.trim().to_string() });
        request
    }

    fn complete(&mut self, request: u64, result: Result<WeatherSnapshot, WeatherApiError>) {
        match result {
            Ok(snapshot) => {
                let view = SnapshotView::derive(snapshot);
                self.dispatch(ViewEvent::FetchSucceeded { request, view });
            }
            Err(e) => {
                error!("Weather fetch failed: {}", e);
                self.dispatch(ViewEvent::FetchFailed { request, reason: e.to_string() });
            }
        }
    }

    fn tick(&mut self, clock: LocalClock) {
        if let Some(zone) = self.ticker_zone.clone() {
            self.dispatch(ViewEvent::Tick { zone, clock });
        }
    }

    /// Fetches `query` and applies the result before returning.
    pub async fn fetch(&mut self, query: &str) {
        self.abort_pending();
        let request = self.begin(query);
        let result = self.source.fetch(query.trim()).await;
        self.complete(request, result);
    }

    /// Starts a fetch in the background; a newer submit supersedes it.
    pub fn submit(&mut self, query: &str) {
        self.abort_pending();
        let request = self.begin(query);
        let source = Arc::clone(&self.source);
        let query = query.trim().to_string();
        self.pending = Some(tokio::spawn(async move {
            let result = source.fetch(&query).await;
            (request, result)
        }));
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            debug!("Aborting in-flight fetch");
            handle.abort();
        }
    }

    /// Event loop: startup fetch of the configured city, then user lines from
    /// `input`, fetch completions and clock ticks until `:q` or `shutdown`.
    pub async fn run<R, W, F>(mut self, input: R, renderer: &mut Renderer<W>, shutdown: F) -> std::io::Result<ViewState>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        F: Future<Output = ()>,
    {
        let city = self.config.city.clone();
        self.submit(&city);
        renderer.render(&self.state)?;

        let mut lines = input.lines();
        let mut input_open = true;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                done = next_fetch(&mut self.pending) => {
                    self.pending = None;
                    match done {
                        Ok((request, result)) => self.complete(request, result),
                        Err(e) if e.is_cancelled() => continue,
                        Err(e) => error!("Fetch task failed to join: {}", e),
                    }
                }
                reading = next_tick(&mut self.ticker) => {
                    match reading {
                        Some(clock) => self.tick(clock),
                        None => {
                            warn!("Clock task ended");
                            self.ticker = None;
                            self.ticker_zone = None;
                            continue;
                        }
                    }
                }
                line = lines.next_line(), if input_open => {
                    match line {
                        Ok(Some(line)) => {
                            let line = line.trim();
                            if line == QUIT_COMMAND {
                                info!("Quit requested");
                                break;
                            }
                            if line.is_empty() {
                                continue;
                            }
                            self.submit(line);
                        }
                        Ok(None) => {
                            debug!("Input closed, no further searches");
                            input_open = false;
                            continue;
                        }
                        Err(e) => {
                            warn!("Input error: {}", e);
                            input_open = false;
                            continue;
                        }
                    }
                }
            }
            renderer.render(&self.state)?;
        }

        self.teardown().await;
        Ok(std::mem::take(&mut self.state))
    }

    async fn teardown(&mut self) {
        self.abort_pending();
        self.ticker_zone = None;
        if let Some(ticker) = self.ticker.take() {
            ticker.stop().await;
        }
    }
}

impl<S> Drop for App<S> {
    fn drop(&mut self) {
        // the ticker stops itself; a detached fetch would not
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

async fn next_fetch(pending: &mut Option<JoinHandle<FetchOutcome>>) -> Result<FetchOutcome, JoinError> {
    match pending {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn next_tick(ticker: &mut Option<ClockTicker>) -> Option<LocalClock> {
    match ticker {
        Some(t) => t.changed().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::weather::{Condition, CurrentWeather, LocationInfo};
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Advances one second per read and counts the reads.
    struct CountingClock {
        start: DateTime<Utc>,
        reads: AtomicI64,
    }

    impl WallClock for CountingClock {
        fn now(&self) -> DateTime<Utc> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            self.start + chrono::Duration::seconds(n)
        }
    }

    #[derive(Default)]
    struct FakeSource {
        queries: Mutex<Vec<String>>,
        fail: bool,
    }

    impl WeatherSource for FakeSource {
        async fn fetch(&self, query: &str) -> Result<WeatherSnapshot, WeatherApiError> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(WeatherApiError::Status(500, "boom".into()));
            }
            Ok(WeatherSnapshot {
                location: LocationInfo {
                    name: Some(query.to_string()),
                    localtime: Some("2024-07-01 13:00".into()),
                    tz_id: Some(if query == "paris" { "Europe/Paris" } else { "Europe/London" }.into()),
                    ..Default::default()
                },
                current: CurrentWeather {
                    temp_c: Some(22.0),
                    cloud: Some(50),
                    is_day: Some(1),
                    condition: Some(Condition { text: Some("Cloudy".into()), icon: None }),
                },
            })
        }
    }

    fn app(source: FakeSource) -> App<FakeSource> {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        App::new(source, Config::default(), Arc::new(FixedClock(now)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_applies_and_starts_clock() {
        let mut app = app(FakeSource::default());
        app.fetch("london").await;
        assert!(app.state().card_visible());
        assert!(app.clock_running());
        assert_eq!(app.state().clock, None);

        let reading = next_tick(&mut app.ticker).await.unwrap();
        app.tick(reading);
        assert_eq!(app.state().clock_lines(), ("2024-07-01".to_string(), "13:00:00".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_starts_no_clock() {
        let mut app = app(FakeSource { fail: true, ..Default::default() });
        app.fetch("london").await;
        assert!(!app.state().loading);
        assert!(!app.state().card_visible());
        assert!(!app.clock_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_submit_supersedes() {
        let mut app = app(FakeSource::default());
        app.submit("oslo");
        app.submit("paris");
        let (request, result) = next_fetch(&mut app.pending).await.unwrap();
        app.pending = None;
        app.complete(request, result);
        assert_eq!(
            app.state().snapshot().unwrap().location.name.as_deref(),
            Some("paris")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_snapshot_replaces_clock_task() {
        let wall = Arc::new(CountingClock {
            start: Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap(),
            reads: AtomicI64::new(0),
        });
        let mut app = App::new(FakeSource::default(), Config::default(), wall.clone());

        app.fetch("london").await;
        let reading = next_tick(&mut app.ticker).await.unwrap();
        app.tick(reading);
        assert!(app.state().clock.is_some());

        app.fetch("paris").await;
        assert_eq!(app.ticker_zone.as_deref(), Some("Europe/Paris"));
        assert_eq!(app.ticker.as_ref().map(|t| t.zone()), Some(chrono_tz::Europe::Paris));
        let reading = next_tick(&mut app.ticker).await.unwrap();
        app.tick(reading);

        // a single task reads the wall clock once a second
        let before = wall.reads.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        let delta = wall.reads.load(Ordering::SeqCst) - before;
        assert!((4..=5).contains(&delta), "{} reads in 5s", delta);

        // a late reading from London no longer lands
        let shown = app.state().clock.clone();
        app.dispatch(ViewEvent::Tick {
            zone: "Europe/London".into(),
            clock: LocalClock { date: "1999-01-01".into(), time: "00:00:00".into() },
        });
        assert_eq!(app.state().clock, shown);
    }

    struct StalledSource {
        alive: Arc<()>,
    }

    impl WeatherSource for StalledSource {
        async fn fetch(&self, _query: &str) -> Result<WeatherSnapshot, WeatherApiError> {
            let _guard = Arc::clone(&self.alive);
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_in_flight_fetch() {
        let alive = Arc::new(());
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let mut app = App::new(StalledSource { alive: alive.clone() }, Config::default(), Arc::new(FixedClock(now)));
        app.submit("oslo");
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert_eq!(Arc::strong_count(&alive), 3);

        drop(app);
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert_eq!(Arc::strong_count(&alive), 1);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_error_ends_run() {
        let app = app(FakeSource::default());
        let mut renderer = Renderer::new(BrokenPipe, Config::default().map, false);
        let input: &[u8] = b"";
        let res = app.run(input, &mut renderer, std::future::pending::<()>()).await;
        assert_eq!(res.unwrap_err().kind(), std::io::ErrorKind::BrokenPipe);
    }
}
