//! Cooperative interruption flag
//!
//! A session hands its [`Interrupt`] to every blocking or long-running
//! operation it starts. Lock waits and evaluation loops poll it; raising it
//! makes them give up with [`Error::Interrupted`] at the next checkpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Shared interruption flag, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// Create a lowered flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag; every clone observes it
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the flag has been raised
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Checkpoint: `Err(Interrupted)` once raised
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_raised() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_shared_between_clones() {
        let a = Interrupt::new();
        let b = a.clone();
        assert!(a.check().is_ok());
        b.raise();
        assert!(a.is_raised());
        assert!(matches!(a.check(), Err(Error::Interrupted)));
    }
}
