//! Per-slot load bookkeeping with a concurrency cap.
//!
//! The [`ResourceLoader`] owns one [`LoadState`] per descriptor and decides
//! whether a request may start. The actual fetch/decode runs on a
//! [`LoadExecutor`]; completions come back through [`ResourceLoader::accept`].

pub mod decode;
pub mod executor;

pub use decode::{BitmapDecode, DecodeChain, DecodeStrategy, DecodedImage, ElementDecode};
pub use executor::{LoadCompletion, LoadExecutor, LoadJob, StartSignal, ThreadPoolExecutor};

use std::time::Duration;

use thiserror::Error;
use web_time::Instant;

use crate::descriptor::SlotIndex;
use crate::error::LoadError;
use crate::lifecycle::{CancellationToken, ChildToken};

/// Load progress of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    /// Terminal; never retried.
    Failed,
}

impl LoadState {
    /// Only forward transitions out of `Unloaded` and `Loading` exist.
    pub fn can_transition_to(self, to: LoadState) -> bool {
        matches!(
            (self, to),
            (LoadState::Unloaded, LoadState::Loading)
                | (LoadState::Loading, LoadState::Loaded)
                | (LoadState::Loading, LoadState::Failed)
        )
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("slot {slot}: cannot go from {from:?} to {to:?}")]
pub struct TransitionError {
    pub slot: SlotIndex,
    pub from: LoadState,
    pub to: LoadState,
}

/// What `request_load` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Slot is already loading, loaded or failed.
    AlreadyHandled,
    /// Concurrency cap reached; try again later.
    AtCapacity,
    Started,
}

/// A completion that should be applied to the scene.
#[derive(Debug)]
pub enum LoadEvent {
    TextureReady {
        slot: SlotIndex,
        image: DecodedImage,
        aspect: f32,
    },
    LoadFailed {
        slot: SlotIndex,
        error: LoadError,
    },
}

struct InFlight {
    token: ChildToken,
    /// Start of the timeout clock. Pushed forward while the job is still
    /// queued behind busy workers.
    started: Instant,
    signal: StartSignal,
    locator: String,
}

pub struct ResourceLoader {
    states: Vec<LoadState>,
    in_flight: Vec<Option<InFlight>>,
    max_concurrent: usize,
    load_timeout: Duration,
    token: CancellationToken,
}

impl ResourceLoader {
    pub fn new(
        slot_count: usize,
        max_concurrent: usize,
        load_timeout: Duration,
        token: CancellationToken,
    ) -> Self {
        Self {
            states: vec![LoadState::Unloaded; slot_count],
            in_flight: (0..slot_count).map(|_| None).collect(),
            max_concurrent: max_concurrent.max(1),
            load_timeout,
            token,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, slot: SlotIndex) -> Option<LoadState> {
        self.states.get(slot.get()).copied()
    }

    pub fn states(&self) -> &[LoadState] {
        &self.states
    }

    pub fn loading_count(&self) -> usize {
        self.count(LoadState::Loading)
    }

    pub fn count(&self, state: LoadState) -> usize {
        self.states.iter().filter(|s| **s == state).count()
    }

    pub fn remaining_budget(&self) -> usize {
        self.max_concurrent.saturating_sub(self.loading_count())
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn has_unloaded(&self) -> bool {
        self.states.contains(&LoadState::Unloaded)
    }

    /// Unloaded slots in index order.
    pub fn unloaded(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == LoadState::Unloaded)
            .map(|(i, _)| SlotIndex(i))
    }

    fn transition(&mut self, slot: SlotIndex, to: LoadState) -> Result<(), TransitionError> {
        let from = self.state(slot).unwrap_or(LoadState::Failed);
        if slot.get() >= self.states.len() || !from.can_transition_to(to) {
            return Err(TransitionError { slot, from, to });
        }
        self.states[slot.get()] = to;
        if to != LoadState::Loading {
            self.in_flight[slot.get()] = None;
        }
        Ok(())
    }

    /// Start loading `slot` from `locator` unless it is already handled or
    /// the cap is reached.
    pub fn request_load(
        &mut self,
        slot: SlotIndex,
        locator: &str,
        executor: &mut dyn LoadExecutor,
        now: Instant,
    ) -> RequestOutcome {
        match self.state(slot) {
            Some(LoadState::Unloaded) => {}
            _ => return RequestOutcome::AlreadyHandled,
        }
        if self.token.is_cancelled() {
            return RequestOutcome::AlreadyHandled;
        }
        if self.loading_count() >= self.max_concurrent {
            return RequestOutcome::AtCapacity;
        }
        if self.transition(slot, LoadState::Loading).is_err() {
            return RequestOutcome::AlreadyHandled;
        }

        let job = LoadJob::new(slot, locator, self.token.child());
        self.in_flight[slot.get()] = Some(InFlight {
            token: job.token.clone(),
            started: now,
            signal: job.started.clone(),
            locator: locator.to_string(),
        });
        executor.submit(job);
        log::debug!("Started load of slot {} ({})", slot, locator);
        RequestOutcome::Started
    }

    /// Validate a completion from the executor.
    ///
    /// Failures are recorded immediately. Successes stay `Loading` until the
    /// caller uploads the texture and calls [`mark_loaded`](Self::mark_loaded)
    /// or [`mark_failed`](Self::mark_failed). Returns `None` for completions
    /// that arrive after teardown, after a timeout, or for a slot that is no
    /// longer loading.
    pub fn accept(&mut self, completion: LoadCompletion) -> Option<LoadEvent> {
        let LoadCompletion {
            slot,
            token,
            result,
        } = completion;

        if self.token.is_cancelled() {
            log::debug!("Discarding completion for slot {} after teardown", slot);
            return None;
        }
        if token.is_cancelled() {
            log::debug!("Discarding late completion for slot {}", slot);
            return None;
        }
        if self.state(slot) != Some(LoadState::Loading) {
            log::debug!("Discarding completion for slot {} in state {:?}", slot, self.state(slot));
            return None;
        }

        match result {
            Ok(image) => {
                let aspect = image.aspect();
                Some(LoadEvent::TextureReady {
                    slot,
                    image,
                    aspect,
                })
            }
            Err(error) => {
                self.mark_failed(slot).ok()?;
                Some(LoadEvent::LoadFailed { slot, error })
            }
        }
    }

    pub fn mark_loaded(&mut self, slot: SlotIndex) -> Result<(), TransitionError> {
        self.transition(slot, LoadState::Loaded)
    }

    pub fn mark_failed(&mut self, slot: SlotIndex) -> Result<(), TransitionError> {
        if let Some(Some(flight)) = self.in_flight.get(slot.get()) {
            flight.token.cancel();
        }
        self.transition(slot, LoadState::Failed)
    }

    /// Fail every load a worker has been running for longer than the
    /// timeout. Jobs no worker has taken yet are not charged.
    pub fn expire_timeouts(&mut self, now: Instant) -> Vec<(SlotIndex, LoadError)> {
        let timeout = self.load_timeout;
        let mut expired: Vec<(SlotIndex, String)> = Vec::new();
        for (i, flight) in self.in_flight.iter_mut().enumerate() {
            let Some(flight) = flight.as_mut() else {
                continue;
            };
            if !flight.signal.is_raised() {
                flight.started = now;
                continue;
            }
            if now.saturating_duration_since(flight.started) >= timeout {
                expired.push((SlotIndex(i), flight.locator.clone()));
            }
        }

        expired
            .into_iter()
            .filter_map(|(slot, locator)| {
                self.mark_failed(slot).ok()?;
                Some((
                    slot,
                    LoadError::TimedOut {
                        locator,
                        seconds: timeout.as_secs_f32(),
                    },
                ))
            })
            .collect()
    }

    /// Drop all in-flight bookkeeping. States are kept for inspection.
    pub fn clear(&mut self) {
        for flight in self.in_flight.iter_mut() {
            if let Some(f) = flight.take() {
                f.token.cancel();
            }
        }
    }
}
