//! Interactive decision port
//!
//! Engine operations that would otherwise guess (marking state, dropping
//! statements during squash) ask through this port instead. The CLI wires a
//! terminal prompt in; tests and `--yes` runs use scripted responders.

/// Outcome of one confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Proceed with this item
    Yes,
    /// Skip this item, continue with the rest
    No,
    /// Stop asking; leave this and all remaining items untouched
    Stop,
}

/// Confirmation source for per-item engine decisions.
pub trait Decide {
    fn confirm(&mut self, prompt: &str) -> Decision;
}

/// Responder that accepts everything, for non-interactive runs.
#[derive(Debug, Default)]
pub struct AcceptAll;

impl Decide for AcceptAll {
    fn confirm(&mut self, _prompt: &str) -> Decision {
        Decision::Yes
    }
}

/// Responder that declines everything.
#[derive(Debug, Default)]
pub struct DeclineAll;

impl Decide for DeclineAll {
    fn confirm(&mut self, _prompt: &str) -> Decision {
        Decision::No
    }
}
