use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for academic terms (e.g. "S8", "S9").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermId(pub String);

/// Identifier wrapper for partner institutions, unique within a roster.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartnerId(pub String);

/// Identifier wrapper for applicants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

/// Subject-area code carried by applicants and partner compatibility lists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectCode(pub String);

/// Per-term precedence flag for a partner. Preferred partners are always
/// offered to an applicant before standard ones during fallback selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Preferred,
    Standard,
}

impl PriorityTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Preferred => "preferred",
            Self::Standard => "standard",
        }
    }

    /// Parses the roster's raw flag cell. Only a case-insensitive "yes"
    /// grants preferred status; anything else, including a blank cell, is
    /// standard.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(value) if value.trim().eq_ignore_ascii_case("yes") => Self::Preferred,
            _ => Self::Standard,
        }
    }
}

/// Completion measure used by the least-filled selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMetric {
    /// Seats taken divided by total seats.
    Rate,
    /// Raw seats-taken count.
    Count,
}

impl FillMetric {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Count => "count",
        }
    }

    /// Parses a selector string, falling back to `Rate` for anything
    /// unrecognized.
    pub fn from_selector(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "count" => Self::Count,
            _ => Self::Rate,
        }
    }
}

impl Default for FillMetric {
    fn default() -> Self {
        Self::Rate
    }
}

/// Per-term seat offer published by a partner institution.
///
/// `seats_total` of `None` means the capacity was never declared; such an
/// offer is treated as having no seats and is never eligible for assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermOffer {
    pub seats_total: Option<u32>,
    #[serde(default)]
    pub seats_taken: u32,
    #[serde(default)]
    pub compatible_subjects: Vec<SubjectCode>,
    #[serde(default = "TermOffer::default_tier")]
    pub tier: PriorityTier,
    #[serde(default)]
    pub min_grade: Option<f32>,
}

impl TermOffer {
    fn default_tier() -> PriorityTier {
        PriorityTier::Standard
    }
}

/// One partner institution with its per-term offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerRecord {
    pub id: PartnerId,
    #[serde(default)]
    pub offers: BTreeMap<TermId, TermOffer>,
}

impl PartnerRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: PartnerId(id.into()),
            offers: BTreeMap::new(),
        }
    }

    pub fn with_offer(mut self, term: TermId, offer: TermOffer) -> Self {
        self.offers.insert(term, offer);
        self
    }

    pub fn offer(&self, term: &TermId) -> Option<&TermOffer> {
        self.offers.get(term)
    }
}

/// Terminal outcome for one applicant in one term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalChoice {
    Assigned(PartnerId),
    Unassigned,
}

impl FinalChoice {
    pub fn label(&self) -> String {
        match self {
            FinalChoice::Assigned(partner) => partner.0.clone(),
            FinalChoice::Unassigned => "unassigned".to_string(),
        }
    }

    pub const fn is_assigned(&self) -> bool {
        matches!(self, FinalChoice::Assigned(_))
    }
}

/// One applicant with ranked wish lists per term.
///
/// `priority_score` and `placements` start empty and are filled in by the
/// ranker and the allocation engine respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub id: ApplicantId,
    pub subject: SubjectCode,
    #[serde(default)]
    pub grade: Option<f32>,
    /// 1-based position in the incoming cohort ordering (1 = top of class).
    #[serde(default)]
    pub original_rank: usize,
    #[serde(default)]
    pub wishes: BTreeMap<TermId, Vec<PartnerId>>,
    #[serde(default)]
    pub priority_score: Option<f64>,
    #[serde(default)]
    pub placements: BTreeMap<TermId, FinalChoice>,
}

impl ApplicantRecord {
    pub fn new(id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: ApplicantId(id.into()),
            subject: SubjectCode(subject.into()),
            grade: None,
            original_rank: 0,
            wishes: BTreeMap::new(),
            priority_score: None,
            placements: BTreeMap::new(),
        }
    }

    pub fn with_grade(mut self, grade: f32) -> Self {
        self.grade = Some(grade);
        self
    }

    pub fn with_wishes(mut self, term: TermId, wishes: Vec<PartnerId>) -> Self {
        self.wishes.insert(term, wishes);
        self
    }

    /// The applicant's ordered wish list for a term; empty when the applicant
    /// made no request for that term.
    pub fn wish_list(&self, term: &TermId) -> &[PartnerId] {
        self.wishes.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of terms with a non-empty wish list (the `k` of the priority
    /// formula).
    pub fn requested_terms(&self) -> usize {
        self.wishes.values().filter(|list| !list.is_empty()).count()
    }

    pub fn placement(&self, term: &TermId) -> Option<&FinalChoice> {
        self.placements.get(term)
    }
}
