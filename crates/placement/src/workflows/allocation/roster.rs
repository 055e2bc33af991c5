use std::collections::HashMap;

use serde::Serialize;

use super::domain::{PartnerId, PartnerRecord, SubjectCode, TermId, TermOffer};

/// Error enumeration for roster construction.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("partner '{0}' appears more than once in the roster")]
    DuplicatePartner(String),
}

/// In-memory store of partner records for one allocation run.
///
/// Records keep their insertion order, which doubles as the tie-break order
/// everywhere a "first seen" rule applies (least-filled ties, subject-wide
/// candidate lists). Seat counters are only reachable through the capacity
/// ledger operations; callers never mutate record fields directly.
#[derive(Debug, Clone, Default)]
pub struct PartnerRoster {
    terms: Vec<TermId>,
    partners: Vec<PartnerRecord>,
    index: HashMap<PartnerId, usize>,
}

impl PartnerRoster {
    pub fn new(terms: Vec<TermId>) -> Self {
        Self {
            terms,
            partners: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn from_records(
        terms: Vec<TermId>,
        records: Vec<PartnerRecord>,
    ) -> Result<Self, RosterError> {
        let mut roster = Self::new(terms);
        for record in records {
            roster.insert(record)?;
        }
        Ok(roster)
    }

    pub fn insert(&mut self, record: PartnerRecord) -> Result<(), RosterError> {
        if self.index.contains_key(&record.id) {
            return Err(RosterError::DuplicatePartner(record.id.0.clone()));
        }
        self.index.insert(record.id.clone(), self.partners.len());
        self.partners.push(record);
        Ok(())
    }

    /// The declared term sequence driving the engine's inner loop.
    pub fn terms(&self) -> &[TermId] {
        &self.terms
    }

    pub fn get(&self, id: &PartnerId) -> Option<&PartnerRecord> {
        self.index.get(id).map(|&slot| &self.partners[slot])
    }

    pub(crate) fn offer(&self, id: &PartnerId, term: &TermId) -> Option<&TermOffer> {
        self.get(id).and_then(|record| record.offer(term))
    }

    pub(crate) fn offer_mut(&mut self, id: &PartnerId, term: &TermId) -> Option<&mut TermOffer> {
        let slot = *self.index.get(id)?;
        self.partners[slot].offers.get_mut(term)
    }

    pub fn partners(&self) -> impl Iterator<Item = &PartnerRecord> {
        self.partners.iter()
    }

    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// All partners whose offer for `term` lists `subject` as compatible, in
    /// roster order.
    pub fn compatible_partners(&self, term: &TermId, subject: &SubjectCode) -> Vec<PartnerId> {
        self.partners
            .iter()
            .filter(|record| {
                record
                    .offer(term)
                    .map(|offer| offer.compatible_subjects.contains(subject))
                    .unwrap_or(false)
            })
            .map(|record| record.id.clone())
            .collect()
    }

    /// Snapshot of final seat counts for export and reporting.
    pub fn seat_usage(&self) -> Vec<SeatUsage> {
        let mut rows = Vec::new();
        for record in &self.partners {
            for term in &self.terms {
                if let Some(offer) = record.offer(term) {
                    rows.push(SeatUsage {
                        partner: record.id.clone(),
                        term: term.clone(),
                        tier: offer.tier.label(),
                        seats_total: offer.seats_total,
                        seats_taken: offer.seats_taken,
                        fill_rate: self.fill_rate(&record.id, term),
                    });
                }
            }
        }
        rows
    }
}

/// Exported per-(partner, term) seat state after a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatUsage {
    pub partner: PartnerId,
    pub term: TermId,
    pub tier: &'static str,
    pub seats_total: Option<u32>,
    pub seats_taken: u32,
    pub fill_rate: Option<f64>,
}
