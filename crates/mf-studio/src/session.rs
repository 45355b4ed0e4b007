use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether a usable credential is currently selected.
///
/// The video tool resets this when the provider rejects the key mid-flight
/// ("Requested entity was not found"), so the embedder knows to prompt for a
/// new key instead of silently failing the next batch too.
#[derive(Debug)]
pub struct CredentialGate {
    selected: AtomicBool,
}

impl CredentialGate {
    pub fn new(selected: bool) -> Self {
        Self {
            selected: AtomicBool::new(selected),
        }
    }

    pub fn select(&self) {
        self.selected.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.selected.store(false, Ordering::Relaxed);
    }

    pub fn is_selected(&self) -> bool {
        self.selected.load(Ordering::Relaxed)
    }
}

impl Default for CredentialGate {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_and_reset() {
        let gate = CredentialGate::default();
        assert!(!gate.is_selected());
        gate.select();
        assert!(gate.is_selected());
        gate.reset();
        assert!(!gate.is_selected());
    }
}
