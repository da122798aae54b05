//! Session id allocation.

use rand::Rng;
use rand::rngs::ThreadRng;

use crate::host::SessionId;

/// Source of session ids.
pub trait IdAllocator {
    fn next_id(&mut self) -> SessionId;
}

/// Random 32-bit ids.
#[derive(Debug)]
pub struct RandomIds<R = ThreadRng> {
    rng: R,
}

impl RandomIds<ThreadRng> {
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for RandomIds<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomIds<R> {
    /// Use a specific generator, e.g. a seeded one for replay.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> IdAllocator for RandomIds<R> {
    fn next_id(&mut self) -> SessionId {
        SessionId(self.rng.random())
    }
}

/// Deterministic ids counting up from 1.
#[derive(Debug, Default)]
pub struct SequentialIds {
    last: u32,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdAllocator for SequentialIds {
    fn next_id(&mut self) -> SessionId {
        self.last = self.last.wrapping_add(1);
        SessionId(self.last)
    }
}
