//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Shared cancellation flag.
///
/// Clones observe the same flag, so a signal handler or a supervising thread
/// can hold one clone while the query checks another.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Fail with [`Error::Interrupted`] if cancellation was requested.
    pub fn check(&self, stage: &str) -> Result<()> {
        if self.is_triggered() {
            tracing::debug!(stage, "Interrupt observed");
            return Err(Error::Interrupted {
                message: format!("cancelled during {stage}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let interrupt = Interrupt::new();
        let handle = interrupt.clone();
        assert!(interrupt.check("setup").is_ok());

        handle.trigger();
        assert!(interrupt.is_triggered());
        let err = interrupt.check("tree").unwrap_err();
        assert!(matches!(err, Error::Interrupted { ref message } if message.contains("tree")));
    }
}
