use crate::infra::{default_allocation_config, InMemoryRunRepository, TracingObserver};
use chrono::Local;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use placement::error::AppError;
use placement::workflows::allocation::{
    AllocationConfig, AllocationRun, ApplicantRecord, FillMetric, PartnerId, PartnerRecord,
    PartnerRoster, PlacementService, PlacementServiceError, PriorityTier, SubjectCode, TermId,
    TermOffer,
};
use placement::workflows::intake::RosterImporter;

#[derive(Args, Debug)]
pub(crate) struct AllocateArgs {
    /// Partner roster CSV export
    #[arg(long)]
    pub(crate) partners: PathBuf,
    /// Applicant cohort CSV export
    #[arg(long)]
    pub(crate) applicants: PathBuf,
    /// Multi-term penalty coefficient
    #[arg(long, default_value_t = 0.05)]
    pub(crate) penalty: f64,
    /// How many leading wishes are treated as firm ordered choices (0-5)
    #[arg(long, default_value_t = 2)]
    pub(crate) ordered_limit: usize,
    /// Fill metric: "rate" or "count"
    #[arg(long, default_value = "rate")]
    pub(crate) fill_metric: String,
    /// Print the full result as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Synthetic cohort size
    #[arg(long, default_value_t = 40)]
    pub(crate) cohort_size: usize,
    /// Multi-term penalty coefficient
    #[arg(long, default_value_t = 0.05)]
    pub(crate) penalty: f64,
    /// How many leading wishes are treated as firm ordered choices (0-5)
    #[arg(long, default_value_t = 2)]
    pub(crate) ordered_limit: usize,
}

pub(crate) fn run_allocate(args: AllocateArgs) -> Result<(), AppError> {
    let AllocateArgs {
        partners,
        applicants,
        penalty,
        ordered_limit,
        fill_metric,
        json,
    } = args;

    let (roster, cohort) = RosterImporter::from_paths(partners, applicants)?;
    let config = AllocationConfig {
        penalty_coefficient: penalty,
        ordered_wish_limit: ordered_limit,
        fill_metric: FillMetric::from_selector(&fill_metric),
    };

    let run = match execute(roster, cohort, config) {
        Ok(run) => run,
        Err(err) => {
            println!("Allocation unavailable: {err}");
            return Ok(());
        }
    };

    if json {
        let terms = run.terms();
        match serde_json::to_string_pretty(&run.result_view(&terms)) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => println!("Could not render result as JSON: {err}"),
        }
    } else {
        render_run(&run);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        cohort_size,
        penalty,
        ordered_limit,
    } = args;

    println!(
        "Placement demo ({}) — synthetic cohort of {}",
        Local::now().date_naive(),
        cohort_size
    );

    let roster = demo_roster();
    let cohort = demo_cohort(cohort_size, &roster);
    let config = AllocationConfig {
        penalty_coefficient: penalty,
        ordered_wish_limit: ordered_limit,
        ..default_allocation_config()
    };

    match execute(roster, cohort, config) {
        Ok(run) => render_run(&run),
        Err(err) => println!("Allocation unavailable: {err}"),
    }

    Ok(())
}

fn execute(
    roster: PartnerRoster,
    cohort: Vec<ApplicantRecord>,
    config: AllocationConfig,
) -> Result<AllocationRun, PlacementServiceError> {
    let service = PlacementService::new(
        Arc::new(InMemoryRunRepository::default()),
        Arc::new(TracingObserver),
        config,
    );
    service.run(roster, cohort)
}

fn render_run(run: &AllocationRun) {
    println!(
        "Run {} — {} applicants, penalty {}, ordered limit {}, metric {}",
        run.run_id.0,
        run.summary.total_applicants,
        run.config.penalty_coefficient,
        run.config.ordered_wish_limit,
        run.config.fill_metric.label()
    );

    for outcome in &run.summary.term_outcomes {
        let rate = outcome
            .placement_rate
            .map(|rate| format!("{:.0}%", rate * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "- {}: {} requested | {} placed | {} unplaced | {} placement rate",
            outcome.term.0, outcome.requested, outcome.placed, outcome.unplaced, rate
        );
    }

    println!("Tier completion:");
    for entry in &run.summary.tier_fill {
        let mean = entry
            .mean_fill_rate
            .map(|rate| format!("{:.2}", rate))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  - {} {}: {} partner(s), mean fill {}",
            entry.term.0, entry.tier, entry.partners, mean
        );
    }

    let terms = run.terms();
    println!("Assignments:");
    for applicant in &run.cohort {
        let choices: Vec<String> = terms
            .iter()
            .map(|term| {
                let label = applicant
                    .placement(term)
                    .map(|choice| choice.label())
                    .unwrap_or_else(|| "unassigned".to_string());
                format!("{}: {}", term.0, label)
            })
            .collect();
        println!(
            "  {:>3}. {} ({}) -> {}",
            applicant.original_rank,
            applicant.id.0,
            applicant.subject.0,
            choices.join(" | ")
        );
    }
}

/// Fixed partner roster for the demo: two terms, mixed tiers, a couple of
/// grade floors, one undeclared capacity.
fn demo_roster() -> PartnerRoster {
    let s8 = TermId("S8".to_string());
    let s9 = TermId("S9".to_string());

    let offers: &[(&str, Option<u32>, Option<u32>, &[&str], bool, Option<f32>)] = &[
        // name, seats S8, seats S9, subjects, preferred, min grade
        ("Aalto", Some(3), Some(2), &["MM", "EIT"], true, Some(13.0)),
        ("KU Leuven", Some(4), Some(4), &["MM", "MC", "IDU"], false, None),
        ("Politecnico Torino", Some(2), Some(3), &["BAT", "IDU"], true, None),
        ("Uppsala", Some(3), None, &["SNI", "EIT"], false, None),
        ("TU Wien", Some(2), Some(2), &["BAT", "MM"], false, Some(11.0)),
        ("Porto", Some(1), Some(2), &["MC", "SNI"], false, None),
        ("NTNU", Some(2), Some(1), &["EIT", "SNI", "MC"], true, None),
        ("Prague CTU", Some(3), Some(3), &["BAT", "IDU", "MM"], false, None),
    ];

    let mut partners = Vec::new();
    for (name, seats_s8, seats_s9, subjects, preferred, min_grade) in offers {
        let subjects: Vec<SubjectCode> = subjects
            .iter()
            .map(|code| SubjectCode(code.to_string()))
            .collect();
        let tier = if *preferred {
            PriorityTier::Preferred
        } else {
            PriorityTier::Standard
        };
        let offer_for = |seats: Option<u32>| TermOffer {
            seats_total: seats,
            seats_taken: 0,
            compatible_subjects: subjects.clone(),
            tier,
            min_grade: *min_grade,
        };
        partners.push(
            PartnerRecord::new(*name)
                .with_offer(s8.clone(), offer_for(*seats_s8))
                .with_offer(s9.clone(), offer_for(*seats_s9)),
        );
    }

    PartnerRoster::from_records(vec![s8, s9], partners).expect("demo roster builds")
}

/// Deterministic synthetic cohort: subject mix follows the historical group
/// quotas, grades descend linearly, every third applicant requests a single
/// term, and wish lists rotate through the compatible partners so repeated
/// demo runs are reproducible.
fn demo_cohort(size: usize, roster: &PartnerRoster) -> Vec<ApplicantRecord> {
    const SUBJECT_QUOTAS: &[(&str, usize)] = &[
        ("MM", 40),
        ("MC", 20),
        ("SNI", 20),
        ("BAT", 40),
        ("EIT", 20),
        ("IDU", 20),
    ];
    let quota_total: usize = SUBJECT_QUOTAS.iter().map(|(_, share)| share).sum();
    let terms = roster.terms().to_vec();

    let mut subjects = Vec::with_capacity(size);
    for (code, share) in SUBJECT_QUOTAS {
        let count = (share * size + quota_total / 2) / quota_total;
        subjects.extend(std::iter::repeat(*code).take(count));
    }
    subjects.truncate(size);
    while subjects.len() < size {
        subjects.push("MM");
    }

    let mut cohort = Vec::with_capacity(size);
    for (index, code) in subjects.iter().enumerate() {
        let grade = 19.0 - 12.0 * index as f32 / size.max(1) as f32;
        let mut applicant = ApplicantRecord::new(format!("applicant-{:03}", index + 1), *code);
        applicant.grade = Some((grade * 100.0).round() / 100.0);

        let single_term = index % 3 == 0;
        let chosen_term = index % terms.len();
        for (term_index, term) in terms.iter().enumerate() {
            if single_term && term_index != chosen_term {
                continue;
            }
            let compatible = roster.compatible_partners(term, &applicant.subject);
            if compatible.is_empty() {
                continue;
            }
            let wishes: Vec<PartnerId> = (0..compatible.len().min(5))
                .map(|offset| compatible[(index + offset) % compatible.len()].clone())
                .collect();
            applicant.wishes.insert(term.clone(), wishes);
        }

        cohort.push(applicant);
    }

    cohort
}
