/// Cooperative stop flag for the job currently on the panel.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    flag: Arc<AtomicBool>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running routine to stop before its next frame.
    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Called by the worker before each job so a stale stop never carries over.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_is_shared_between_clones() {
        let signal = CancellationSignal::new();
        let observer = signal.clone();
        assert!(!observer.is_set());

        signal.raise();
        signal.raise();
        assert!(observer.is_set());

        observer.reset();
        assert!(!signal.is_set());
    }
}
