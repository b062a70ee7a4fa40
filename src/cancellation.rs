use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared stop flag for long-running background loops.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_cancellation() {
        let token = CancellationToken::new();
        let watcher = token.clone();
        assert!(!watcher.is_cancelled());
        token.cancel();
        assert!(watcher.is_cancelled());
    }
}
