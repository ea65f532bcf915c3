//! Page views. Each view owns only transient presentation state and renders
//! itself to plain text.

use std::sync::atomic::{AtomicU64, Ordering};

pub mod components;
pub mod details;
pub mod favorites;
pub mod home;

pub use details::{DetailsRequest, DetailsState, DetailsView};
pub use favorites::FavoritesView;
pub use home::{HomeRequest, HomeView, PageChange, PendingRequest};

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifies one catalog request. Tickets are unique for the whole process,
/// so a completion can never be mistaken for a request issued by a view that
/// replaced the original one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Tracks the newest request a view issued; older completions are stale.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    latest: Option<Ticket>,
}

impl RequestGeneration {
    pub fn issue(&mut self) -> Ticket {
        let ticket = Ticket(NEXT_TICKET.fetch_add(1, Ordering::Relaxed));
        self.latest = Some(ticket);
        ticket
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest == Some(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_newest_ticket_is_current() {
        let mut generation = RequestGeneration::default();
        let first = generation.issue();
        let second = generation.issue();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[test]
    fn tickets_from_other_views_never_match() {
        let mut a = RequestGeneration::default();
        let mut b = RequestGeneration::default();
        let from_a = a.issue();
        b.issue();
        assert!(!b.is_current(from_a));
    }
}
