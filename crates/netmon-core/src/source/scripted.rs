use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::error::CoreError;
use crate::model::{ConnectionInfo, Counters};

use super::DataSource;

/// Deterministic source that replays a fixed sequence of readings.
///
/// Once the script is exhausted the last reading repeats, like an idle
/// interface.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    state: Mutex<ScriptState>,
    connections: Vec<ConnectionInfo>,
}

#[derive(Debug, Default)]
struct ScriptState {
    pending: VecDeque<Counters>,
    last: Counters,
    reads: usize,
}

impl ScriptedSource {
    pub fn new(readings: impl IntoIterator<Item = Counters>) -> Self {
        Self {
            state: Mutex::new(ScriptState {
                pending: readings.into_iter().collect(),
                ..ScriptState::default()
            }),
            connections: Vec::new(),
        }
    }

    /// Counters growing by a constant step per reading, starting at zero.
    pub fn linear(step_in: u64, step_out: u64, readings: u64) -> Self {
        Self::new((0..readings).map(|i| Counters::new(i * step_in, i * step_out)))
    }

    #[must_use]
    pub fn with_connections(mut self, connections: Vec<ConnectionInfo>) -> Self {
        self.connections = connections;
        self
    }

    /// Number of counter readings handed out so far.
    pub fn reads(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reads
    }
}

impl DataSource for ScriptedSource {
    fn sample_counters(&self) -> Result<Counters, CoreError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(next) = state.pending.pop_front() {
            state.last = next;
        }
        state.reads += 1;
        Ok(state.last)
    }

    fn list_connections(&self) -> Vec<ConnectionInfo> {
        self.connections.clone()
    }
}
