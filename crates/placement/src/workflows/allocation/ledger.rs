//! Seat-capacity queries and the single seat mutator.
//!
//! Every query returns `None` when the (partner, term) combination is missing
//! or the underlying value was never declared; an unknown capacity never
//! satisfies `has_seat`. `take_seat` is the only mutation in the whole
//! allocation core and callers must gate it with `has_seat` — the run is
//! single-threaded, so the check and the take are never interleaved.

use super::domain::{PartnerId, TermId};
use super::roster::PartnerRoster;

impl PartnerRoster {
    /// Declared seat total for a partner/term, `None` when undeclared.
    pub fn total_seats(&self, partner: &PartnerId, term: &TermId) -> Option<u32> {
        self.offer(partner, term).and_then(|offer| offer.seats_total)
    }

    /// Current taken count, `None` when the partner/term offer is missing.
    pub fn seats_taken(&self, partner: &PartnerId, term: &TermId) -> Option<u32> {
        self.offer(partner, term).map(|offer| offer.seats_taken)
    }

    /// `total - taken`; negative when the imported table already overshot.
    pub fn seats_available(&self, partner: &PartnerId, term: &TermId) -> Option<i64> {
        let total = self.total_seats(partner, term)?;
        let taken = self.seats_taken(partner, term)?;
        Some(i64::from(total) - i64::from(taken))
    }

    /// `taken / total`, exactly 1.0 for a declared zero-capacity offer so it
    /// is never preferred by the least-filled selector.
    pub fn fill_rate(&self, partner: &PartnerId, term: &TermId) -> Option<f64> {
        let total = self.total_seats(partner, term)?;
        let taken = self.seats_taken(partner, term)?;
        if total == 0 {
            return Some(1.0);
        }
        Some(f64::from(taken) / f64::from(total))
    }

    pub fn has_seat(&self, partner: &PartnerId, term: &TermId) -> bool {
        self.seats_available(partner, term)
            .map(|available| available > 0)
            .unwrap_or(false)
    }

    /// Increments the taken count by exactly one. Silent no-op when the
    /// partner/term offer does not exist.
    pub fn take_seat(&mut self, partner: &PartnerId, term: &TermId) {
        if let Some(offer) = self.offer_mut(partner, term) {
            offer.seats_taken = offer.seats_taken.saturating_add(1);
        }
    }
}
