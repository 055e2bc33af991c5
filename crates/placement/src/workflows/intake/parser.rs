use std::io::Read;

use super::normalizer::{normalize_name, split_delimited};
use super::RosterImportError;
use crate::workflows::allocation::domain::{
    ApplicantRecord, PartnerId, PartnerRecord, PriorityTier, SubjectCode, TermId, TermOffer,
};

const PARTNER_COLUMN: &str = "Partner";
const APPLICANT_COLUMN: &str = "Applicant";
const SUBJECT_COLUMN: &str = "Subject";
const GRADE_COLUMN: &str = "Grade";
const SEATS_PREFIX: &str = "Seats ";
const TAKEN_PREFIX: &str = "Taken ";
const SUBJECTS_PREFIX: &str = "Subjects ";
const PREFERRED_PREFIX: &str = "Preferred ";
const MIN_GRADE_PREFIX: &str = "Min Grade ";
const WISHES_PREFIX: &str = "Wishes ";

/// Per-term column slots discovered from the partner table header row.
struct TermColumns {
    term: TermId,
    seats: usize,
    taken: Option<usize>,
    subjects: Option<usize>,
    preferred: Option<usize>,
    min_grade: Option<usize>,
}

/// Parses the partner table. The term sequence is discovered from the
/// `Seats <term>` column family, in header order; the companion columns for
/// each term are optional.
pub(crate) fn parse_partners<R: Read>(
    reader: R,
) -> Result<(Vec<TermId>, Vec<PartnerRecord>), RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_name)
        .collect();

    let name_column = headers
        .iter()
        .position(|header| header == PARTNER_COLUMN)
        .ok_or_else(|| {
            RosterImportError::Shape(format!(
                "partner table is missing its '{PARTNER_COLUMN}' column"
            ))
        })?;

    let mut term_columns = Vec::new();
    for (slot, header) in headers.iter().enumerate() {
        if let Some(raw_term) = header.strip_prefix(SEATS_PREFIX) {
            let term = TermId(raw_term.to_string());
            term_columns.push(TermColumns {
                seats: slot,
                taken: find_column(&headers, TAKEN_PREFIX, raw_term),
                subjects: find_column(&headers, SUBJECTS_PREFIX, raw_term),
                preferred: find_column(&headers, PREFERRED_PREFIX, raw_term),
                min_grade: find_column(&headers, MIN_GRADE_PREFIX, raw_term),
                term,
            });
        }
    }

    if term_columns.is_empty() {
        return Err(RosterImportError::Shape(format!(
            "partner table declares no '{SEATS_PREFIX}<term>' column family"
        )));
    }

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let name = normalize_name(row.get(name_column).unwrap_or(""));
        if name.is_empty() {
            continue;
        }

        let mut record = PartnerRecord::new(name);
        for columns in &term_columns {
            let offer = TermOffer {
                seats_total: cell(&row, Some(columns.seats)).and_then(parse_count),
                seats_taken: cell(&row, columns.taken)
                    .and_then(parse_count)
                    .unwrap_or(0),
                compatible_subjects: cell(&row, columns.subjects)
                    .map(|value| split_delimited(value).into_iter().map(SubjectCode).collect())
                    .unwrap_or_default(),
                tier: PriorityTier::from_flag(cell(&row, columns.preferred)),
                min_grade: cell(&row, columns.min_grade).and_then(parse_grade),
            };
            record = record.with_offer(columns.term.clone(), offer);
        }
        records.push(record);
    }

    let terms = term_columns.into_iter().map(|columns| columns.term).collect();
    Ok((terms, records))
}

/// Parses the applicant table. Wish columns are read only for the terms the
/// partner table declared; row order becomes the incoming cohort ranking.
pub(crate) fn parse_applicants<R: Read>(
    reader: R,
    terms: &[TermId],
) -> Result<Vec<ApplicantRecord>, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_name)
        .collect();

    let id_column = headers
        .iter()
        .position(|header| header == APPLICANT_COLUMN)
        .ok_or_else(|| {
            RosterImportError::Shape(format!(
                "applicant table is missing its '{APPLICANT_COLUMN}' column"
            ))
        })?;
    let subject_column = headers
        .iter()
        .position(|header| header == SUBJECT_COLUMN)
        .ok_or_else(|| {
            RosterImportError::Shape(format!(
                "applicant table is missing its '{SUBJECT_COLUMN}' column"
            ))
        })?;
    let grade_column = headers.iter().position(|header| header == GRADE_COLUMN);

    let wish_columns: Vec<(TermId, Option<usize>)> = terms
        .iter()
        .map(|term| {
            (
                term.clone(),
                find_column(&headers, WISHES_PREFIX, &term.0),
            )
        })
        .collect();

    let mut applicants = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let id = normalize_name(row.get(id_column).unwrap_or(""));
        if id.is_empty() {
            continue;
        }
        let subject = normalize_name(row.get(subject_column).unwrap_or(""));

        let mut applicant = ApplicantRecord::new(id, subject);
        applicant.grade = cell(&row, grade_column).and_then(parse_grade);

        for (term, column) in &wish_columns {
            let wishes: Vec<_> = cell(&row, *column)
                .map(split_delimited)
                .unwrap_or_default()
                .into_iter()
                .map(PartnerId)
                .collect();
            if !wishes.is_empty() {
                applicant.wishes.insert(term.clone(), wishes);
            }
        }

        applicants.push(applicant);
    }

    Ok(applicants)
}

fn find_column(headers: &[String], prefix: &str, term: &str) -> Option<usize> {
    let wanted = format!("{prefix}{term}");
    headers.iter().position(|header| header == &wanted)
}

fn cell<'a>(row: &'a csv::StringRecord, slot: Option<usize>) -> Option<&'a str> {
    let value = row.get(slot?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Seat counts sometimes arrive as spreadsheet floats ("12.0"); anything that
/// does not resolve to a non-negative whole number is treated as undeclared.
fn parse_count(value: &str) -> Option<u32> {
    if let Ok(count) = value.parse::<u32>() {
        return Some(count);
    }
    let float = value.parse::<f64>().ok()?;
    if float.is_finite() && float >= 0.0 && float.fract() == 0.0 {
        Some(float as u32)
    } else {
        None
    }
}

fn parse_grade(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|grade| grade.is_finite())
}
