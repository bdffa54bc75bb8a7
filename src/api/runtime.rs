//! Single-writer event loop around [`ChaseTracker`]
//!
//! One task owns the tracker and the position source. Position updates, user
//! commands and the alert-expiry tick are handled strictly one at a time, so
//! no fix is ever processed concurrently with another.

use crate::alerting::AlertId;
use crate::api::tracker::ChaseTracker;
use crate::core::{now_ms, Fix, SevereWeatherNotice};
use crate::source::{PositionSource, PositionUpdate, WatchId};
use crate::utils::TrackerConfig;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

const COMMAND_BUFFER: usize = 32;

/// Position updates handled back to back before commands get priority
const POSITION_BURST: usize = 64;

/// Requests accepted by the runtime
#[derive(Debug)]
pub enum Command {
    Start,
    Stop,
    Toggle,
    /// Drop a breadcrumb at the current position, fetching one if unknown
    MarkPosition,
    ToggleVoice,
    SevereWeather(SevereWeatherNotice),
    DismissAlert(AlertId),
    Status(oneshot::Sender<TrackerStatus>),
    Shutdown,
}

/// Snapshot returned by [`TrackerHandle::status`]
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerStatus {
    pub tracking: bool,
    pub voice_enabled: bool,
    pub active_alerts: usize,
    pub last_position: Option<Fix>,
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("tracker runtime has shut down")]
    Closed,
}

/// Cloneable sender side of the runtime
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<Command>,
}

impl TrackerHandle {
    pub async fn send(&self, command: Command) -> Result<(), RuntimeError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RuntimeError::Closed)
    }

    pub async fn start(&self) -> Result<(), RuntimeError> {
        self.send(Command::Start).await
    }

    pub async fn stop(&self) -> Result<(), RuntimeError> {
        self.send(Command::Stop).await
    }

    pub async fn toggle(&self) -> Result<(), RuntimeError> {
        self.send(Command::Toggle).await
    }

    pub async fn mark_position(&self) -> Result<(), RuntimeError> {
        self.send(Command::MarkPosition).await
    }

    pub async fn toggle_voice(&self) -> Result<(), RuntimeError> {
        self.send(Command::ToggleVoice).await
    }

    pub async fn severe_weather(&self, notice: SevereWeatherNotice) -> Result<(), RuntimeError> {
        self.send(Command::SevereWeather(notice)).await
    }

    pub async fn dismiss_alert(&self, id: AlertId) -> Result<(), RuntimeError> {
        self.send(Command::DismissAlert(id)).await
    }

    pub async fn status(&self) -> Result<TrackerStatus, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Status(tx)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(Command::Shutdown).await
    }
}

/// Owns the tracker and the position source while running
pub struct TrackerRuntime<S: PositionSource> {
    tracker: ChaseTracker,
    source: S,
    config: TrackerConfig,
    commands: mpsc::Receiver<Command>,
    watch: Option<(WatchId, mpsc::UnboundedReceiver<PositionUpdate>)>,
    current_tx: mpsc::UnboundedSender<PositionUpdate>,
    current_rx: mpsc::UnboundedReceiver<PositionUpdate>,
    pending_mark: bool,
}

impl<S: PositionSource> TrackerRuntime<S> {
    pub fn new(tracker: ChaseTracker, source: S, config: TrackerConfig) -> (Self, TrackerHandle) {
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (current_tx, current_rx) = mpsc::unbounded_channel();

        let runtime = Self {
            tracker,
            source,
            config,
            commands,
            watch: None,
            current_tx,
            current_rx,
            pending_mark: false,
        };
        (runtime, TrackerHandle { commands: commands_tx })
    }

    /// Process events until shutdown or until every handle is dropped.
    /// Returns the tracker and source for inspection.
    pub async fn run(mut self) -> (ChaseTracker, S) {
        // Seed the last known position the way the dashboard does on load
        self.source
            .request_current(&self.config.current_options, self.current_tx.clone());
        if self.tracker.restore(now_ms()) {
            self.begin_watch();
        }

        let mut ticker = tokio::time::interval(self.config.expiry_tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut burst = 0;
        loop {
            // Delivered positions drain before the next command is seen, up to
            // POSITION_BURST in a row; then commands and the tick go first once.
            let next = if burst < POSITION_BURST {
                tokio::select! {
                    biased;

                    update = next_watch_update(&mut self.watch) => Next::Watch(update),
                    Some(update) = self.current_rx.recv() => Next::Current(update),
                    command = self.commands.recv() => Next::Command(command),
                    _ = ticker.tick() => Next::Tick,
                }
            } else {
                burst = 0;
                tokio::select! {
                    biased;

                    command = self.commands.recv() => Next::Command(command),
                    _ = ticker.tick() => Next::Tick,
                    update = next_watch_update(&mut self.watch) => Next::Watch(update),
                    Some(update) = self.current_rx.recv() => Next::Current(update),
                }
            };

            match next {
                Next::Watch(Some(update)) => {
                    burst += 1;
                    self.handle_watch_update(update);
                }
                Next::Watch(None) => {
                    debug!("position watch closed by source");
                    self.watch = None;
                }
                Next::Current(update) => {
                    burst += 1;
                    self.handle_current_update(update);
                }
                Next::Command(Some(Command::Shutdown) | None) => break,
                Next::Command(Some(command)) => {
                    burst = 0;
                    self.handle_command(command);
                }
                Next::Tick => {
                    burst = 0;
                    self.tracker.expire_alerts(clock_now());
                }
            }
        }

        self.end_watch();
        info!("tracker runtime stopped");
        (self.tracker, self.source)
    }

    fn handle_command(&mut self, command: Command) {
        let now = now_ms();
        match command {
            Command::Start => {
                if self.tracker.start(now) {
                    self.begin_watch();
                }
            }
            Command::Stop => {
                if self.tracker.stop(now) {
                    self.end_watch();
                }
            }
            Command::Toggle => {
                if self.tracker.is_tracking() {
                    self.handle_command(Command::Stop);
                } else {
                    self.handle_command(Command::Start);
                }
            }
            Command::MarkPosition => {
                if self.tracker.mark_current_position(now).is_none() {
                    debug!("no known position, requesting one");
                    self.pending_mark = true;
                    self.source
                        .request_current(&self.config.current_options, self.current_tx.clone());
                }
            }
            Command::ToggleVoice => {
                self.tracker.toggle_voice();
            }
            Command::SevereWeather(notice) => {
                self.tracker.severe_weather(&notice, clock_now());
            }
            Command::DismissAlert(id) => {
                self.tracker.dismiss_alert(id);
            }
            Command::Status(reply) => {
                let _ = reply.send(self.status());
            }
            Command::Shutdown => {}
        }
    }

    fn handle_watch_update(&mut self, update: PositionUpdate) {
        match update {
            PositionUpdate::Fix(fix) => {
                self.tracker.handle_fix(fix);
            }
            PositionUpdate::Error(error) => self.tracker.handle_error(error),
        }
    }

    fn handle_current_update(&mut self, update: PositionUpdate) {
        match update {
            PositionUpdate::Fix(fix) => {
                self.tracker.observe_position(fix);
                if std::mem::take(&mut self.pending_mark) {
                    self.tracker.mark_current_position(now_ms());
                }
            }
            PositionUpdate::Error(error) => {
                self.pending_mark = false;
                self.tracker.handle_error(error);
            }
        }
    }

    fn begin_watch(&mut self) {
        self.end_watch();
        // Fresh channel per watch so nothing from an old session leaks in
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.source.watch(&self.config.watch_options, tx);
        debug!(watch = id.0, "position watch started");
        self.watch = Some((id, rx));
    }

    fn end_watch(&mut self) {
        if let Some((id, _rx)) = self.watch.take() {
            self.source.clear_watch(id);
            debug!(watch = id.0, "position watch cleared");
        }
    }

    fn status(&self) -> TrackerStatus {
        TrackerStatus {
            tracking: self.tracker.is_tracking(),
            voice_enabled: self.tracker.voice_enabled(),
            active_alerts: self.tracker.alerting().board().active().len(),
            last_position: self.tracker.last_position(),
        }
    }

    pub fn tracker(&self) -> &ChaseTracker {
        &self.tracker
    }
}

/// Whichever event source the loop picked
enum Next {
    Watch(Option<PositionUpdate>),
    Current(PositionUpdate),
    Command(Option<Command>),
    Tick,
}

async fn next_watch_update(
    watch: &mut Option<(WatchId, mpsc::UnboundedReceiver<PositionUpdate>)>,
) -> Option<PositionUpdate> {
    match watch {
        Some((_, rx)) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Monotonic clock that follows tokio's (possibly paused) time
fn clock_now() -> Instant {
    tokio::time::Instant::now().into_std()
}
