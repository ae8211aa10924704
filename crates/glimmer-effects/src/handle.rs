//! Stop handles for looping effects.

use std::cell::Cell;
use std::rc::Rc;

/// Handle to a looping effect.
///
/// Clones share the same flag. Once stopped an effect no longer touches
/// the surface; there is no restart.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    name: &'static str,
    stopped: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            stopped: Rc::new(Cell::new(false)),
        }
    }

    /// Name of the effect this handle controls.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop the loop.
    pub fn stop(&self) {
        self.stopped.set(true);
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let handle = LoopHandle::new("cursor");
        let other = handle.clone();
        assert!(other.is_running());
        handle.stop();
        assert!(!other.is_running());
        assert_eq!(other.name(), "cursor");
    }
}
