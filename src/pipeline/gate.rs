//! Bounded concurrency gates
//!
//! A [`Gate`] is a counting semaphore: [`Gate::acquire`] blocks until one of
//! `capacity` slots is free and hands back a [`Permit`] that frees the slot
//! when dropped. Waiters are admitted in arrival order.
//!
//! The pipeline owns two independent gates, see [`ConcurrencyGates`]. Entry
//! writes only ever take the `io` gate and build invocations only ever take
//! the `exec` gate, so cheap filesystem work never competes with CPU-bound
//! build processes for the same budget.

use parking_lot::{Condvar, Mutex};
use std::num::NonZeroUsize;

use super::config::GateConfig;
use super::error::PipelineError;

#[derive(Debug, Default)]
struct GateState {
    in_use: usize,
    peak: usize,
    next_ticket: u64,
    now_serving: u64,
}

/// A counting semaphore with FIFO admission
///
/// # Examples
///
/// ```
/// use bundle_sizer::pipeline::Gate;
/// use std::num::NonZeroUsize;
///
/// let gate = Gate::new("exec", NonZeroUsize::new(2).unwrap());
/// let first = gate.acquire();
/// let second = gate.acquire();
/// assert_eq!(gate.in_use(), 2);
/// drop(first);
/// assert_eq!(gate.in_use(), 1);
/// drop(second);
/// assert_eq!(gate.peak(), 2);
/// ```
#[derive(Debug)]
pub struct Gate {
    name: &'static str,
    capacity: usize,
    state: Mutex<GateState>,
    available: Condvar,
}

impl Gate {
    /// Create a gate admitting at most `capacity` concurrent holders
    pub fn new(name: &'static str, capacity: NonZeroUsize) -> Self {
        Self {
            name,
            capacity: capacity.get(),
            state: Mutex::new(GateState::default()),
            available: Condvar::new(),
        }
    }

    /// Gate name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Maximum number of concurrent holders
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently held
    pub fn in_use(&self) -> usize {
        self.state.lock().in_use
    }

    /// Highest number of permits held at the same time so far
    pub fn peak(&self) -> usize {
        self.state.lock().peak
    }

    /// Block until a slot is free, then take it
    pub fn acquire(&self) -> Permit<'_> {
        let mut state = self.state.lock();
        let ticket = state.next_ticket;
        state.next_ticket += 1;

        while state.now_serving != ticket || state.in_use >= self.capacity {
            self.available.wait(&mut state);
        }

        state.now_serving += 1;
        state.in_use += 1;
        state.peak = state.peak.max(state.in_use);
        log::trace!(
            "{} gate: admitted ticket {} ({}/{})",
            self.name,
            ticket,
            state.in_use,
            self.capacity
        );
        drop(state);

        // The next ticket may be admissible too if slots remain.
        self.available.notify_all();
        Permit { gate: self }
    }

    fn release(&self) {
        let mut state = self.state.lock();
        state.in_use -= 1;
        drop(state);
        self.available.notify_all();
    }
}

/// A held gate slot; released on drop
#[derive(Debug)]
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct Permit<'a> {
    gate: &'a Gate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

/// The two independent gates used by one run
#[derive(Debug)]
pub struct ConcurrencyGates {
    /// Bounds concurrent entry-source writes
    pub io: Gate,
    /// Bounds concurrent build-process invocations
    pub exec: Gate,
}

impl ConcurrencyGates {
    /// Build both gates, rejecting zero capacities
    pub fn new(config: &GateConfig) -> Result<Self, PipelineError> {
        let io = NonZeroUsize::new(config.io)
            .ok_or_else(|| PipelineError::InvalidConfig("io gate capacity must be at least 1".into()))?;
        let exec = NonZeroUsize::new(config.exec).ok_or_else(|| {
            PipelineError::InvalidConfig("exec gate capacity must be at least 1".into())
        })?;

        Ok(Self {
            io: Gate::new("io", io),
            exec: Gate::new("exec", exec),
        })
    }
}
