//! Scripted position source for testing and demos

use crate::core::Fix;
use crate::source::{PositionError, PositionOptions, PositionSource, PositionUpdate, UpdateSender, WatchId};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Mock position source that replays a scripted drive
pub struct MockPositionSource {
    script: VecDeque<PositionUpdate>,
    current: Option<Fix>,
    failure: Option<PositionError>,
    watches: HashMap<WatchId, UpdateSender>,
    next_watch: u32,
    requests: u32,
}

impl MockPositionSource {
    /// Create a new mock source with nothing scripted
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            current: None,
            failure: None,
            watches: HashMap::new(),
            next_watch: 0,
            requests: 0,
        }
    }

    /// Create a source whose first watch replays `updates` in order
    pub fn with_script(updates: impl IntoIterator<Item = PositionUpdate>) -> Self {
        let mut source = Self::new();
        source.script.extend(updates);
        source
    }

    /// Queue a fix for the next watch
    pub fn add_fix(&mut self, fix: Fix) {
        self.script.push_back(PositionUpdate::Fix(fix));
    }

    /// Queue an error for the next watch
    pub fn add_error(&mut self, error: PositionError) {
        self.script.push_back(PositionUpdate::Error(error));
    }

    /// Position reported to one-shot requests
    pub fn set_current(&mut self, fix: Fix) {
        self.current = Some(fix);
    }

    /// Make every watch and request fail with `error` until cleared
    pub fn fail_with(&mut self, error: Option<PositionError>) {
        self.failure = error;
    }

    /// Send a fix to every active watch
    pub fn push_fix(&mut self, fix: Fix) {
        self.broadcast(PositionUpdate::Fix(fix));
    }

    /// Send an error to every active watch
    pub fn push_error(&mut self, error: PositionError) {
        self.broadcast(PositionUpdate::Error(error));
    }

    pub fn active_watch_count(&self) -> usize {
        self.watches.len()
    }

    pub fn queued_update_count(&self) -> usize {
        self.script.len()
    }

    pub fn request_count(&self) -> u32 {
        self.requests
    }

    fn broadcast(&mut self, update: PositionUpdate) {
        // Drop watches whose consumer has gone away
        self.watches
            .retain(|_, sender| sender.send(update.clone()).is_ok());
    }
}

impl Default for MockPositionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionSource for MockPositionSource {
    fn watch(&mut self, options: &PositionOptions, sender: UpdateSender) -> WatchId {
        self.next_watch += 1;
        let id = WatchId(self.next_watch);
        debug!(watch = id.0, timeout_ms = options.timeout_ms, "mock watch started");

        if let Some(error) = self.failure {
            let _ = sender.send(PositionUpdate::Error(error));
        }
        while let Some(update) = self.script.pop_front() {
            if sender.send(update).is_err() {
                break;
            }
        }

        self.watches.insert(id, sender);
        id
    }

    fn clear_watch(&mut self, id: WatchId) {
        if self.watches.remove(&id).is_some() {
            debug!(watch = id.0, "mock watch cleared");
        }
    }

    fn request_current(&mut self, _options: &PositionOptions, sender: UpdateSender) {
        self.requests += 1;
        let update = match (self.failure, self.current) {
            (Some(error), _) => PositionUpdate::Error(error),
            (None, Some(fix)) => PositionUpdate::Fix(fix),
            (None, None) => PositionUpdate::Error(PositionError::Unavailable),
        };
        let _ = sender.send(update);
    }
}
