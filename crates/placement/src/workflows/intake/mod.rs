//! CSV intake reshaping raw partner and applicant exports into the canonical
//! roster and cohort used by the allocation workflow.

mod normalizer;
mod parser;

use std::io::Read;
use std::path::Path;

use tracing::warn;

use crate::workflows::allocation::domain::ApplicantRecord;
use crate::workflows::allocation::roster::PartnerRoster;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Shape(String),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Shape(detail) => write!(f, "unusable roster shape: {}", detail),
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Shape(_) => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_paths<P: AsRef<Path>, A: AsRef<Path>>(
        partners: P,
        applicants: A,
    ) -> Result<(PartnerRoster, Vec<ApplicantRecord>), RosterImportError> {
        let partner_file = std::fs::File::open(partners)?;
        let applicant_file = std::fs::File::open(applicants)?;
        Self::from_readers(partner_file, applicant_file)
    }

    pub fn from_readers<P: Read, A: Read>(
        partners: P,
        applicants: A,
    ) -> Result<(PartnerRoster, Vec<ApplicantRecord>), RosterImportError> {
        let (terms, records) = parser::parse_partners(partners)?;
        let cohort = parser::parse_applicants(applicants, &terms)?;

        let mut roster = PartnerRoster::new(terms);
        for record in records {
            let id = record.id.clone();
            if roster.insert(record).is_err() {
                warn!(partner = %id.0, "duplicate partner row ignored, keeping first occurrence");
            }
        }

        Ok((roster, cohort))
    }
}
