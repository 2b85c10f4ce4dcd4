//! Cooperative abort polling

/// Source of user abort requests
///
/// Polled by the sequencer before every primitive command. A request is
/// consumed by the poll that observes it.
pub trait AbortSource {
    /// Check (and clear) a pending abort request
    fn abort_requested(&mut self) -> bool;
}

/// Abort source that never fires
///
/// Used for handling motions (load, grip, release) that must run to
/// completion, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAbort;

impl AbortSource for NeverAbort {
    fn abort_requested(&mut self) -> bool {
        false
    }
}

impl<T: AbortSource + ?Sized> AbortSource for &mut T {
    fn abort_requested(&mut self) -> bool {
        T::abort_requested(self)
    }
}
