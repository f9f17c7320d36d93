//! Subscription lifecycle controller
//!
//! A low-frequency tick compares downstream demand with the current state and
//! starts or stops the upstream subscription. Repeated equal observations
//! never produce a transition.

use tracing::{debug, info, instrument, warn};

use crate::error::IngestionError;

/// Upstream subscription state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubscriptionState {
    #[default]
    Inactive,
    Active,
}

/// State change performed by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Activated,
    Deactivated,
}

/// The upstream side the controller switches on and off
pub trait UpstreamLink {
    /// Establish the upstream subscription
    fn activate(&mut self) -> Result<(), IngestionError>;

    /// Release the upstream subscription
    fn deactivate(&mut self);
}

/// Polled two-state machine driving an [`UpstreamLink`]
#[derive(Debug, Default)]
pub struct SubscriptionUpdater {
    state: SubscriptionState,
}

impl SubscriptionUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SubscriptionState::Active
    }

    /// Observe `consumers` and transition if needed
    ///
    /// A failed activation keeps the state `Inactive`, so the next tick with
    /// demand tries again.
    #[instrument(level = "trace", skip(self, link), fields(state = ?self.state))]
    pub fn tick<L: UpstreamLink + ?Sized>(
        &mut self,
        consumers: usize,
        link: &mut L,
    ) -> Option<Transition> {
        match (self.state, consumers) {
            (SubscriptionState::Inactive, n) if n > 0 => match link.activate() {
                Ok(()) => {
                    self.state = SubscriptionState::Active;
                    info!(consumers = n, "upstream subscription activated");
                    Some(Transition::Activated)
                }
                Err(e) => {
                    warn!(error = %e, "upstream activation failed, retrying next tick");
                    None
                }
            },
            (SubscriptionState::Active, 0) => {
                link.deactivate();
                self.state = SubscriptionState::Inactive;
                info!("upstream subscription deactivated");
                Some(Transition::Deactivated)
            }
            _ => {
                debug!(consumers, "no subscription change");
                None
            }
        }
    }

    /// Release the link if active, e.g. on shutdown
    pub fn force_inactive<L: UpstreamLink + ?Sized>(&mut self, link: &mut L) -> Option<Transition> {
        if self.is_active() {
            link.deactivate();
            self.state = SubscriptionState::Inactive;
            Some(Transition::Deactivated)
        } else {
            None
        }
    }
}
