use crate::config::{MailSettings, Settings};
use crate::core::{layering_report, IdentityFields, MatchingRules, Matcher, TierReport};
use crate::error::AppError;
use crate::models::{RespondentGroup, RunSummary, UnmatchedRecord};
use crate::services::{
    read_matches, MailComposer, MailTransport, ResultWriter, RunArtifacts, SurveyReader,
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};
use uuid::Uuid;

/// Summary and written files of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub outputs: Vec<PathBuf>,
}

/// Read both survey exports, match them, and write every output file.
pub fn run_matching(settings: &Settings) -> Result<RunReport, AppError> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let span = info_span!("run", run_id = %run_id);
    let _guard = span.enter();

    info!(rules = %settings.rules.path, "starting matching run");
    let rules = MatchingRules::load(&settings.rules.path)?;

    let reader = SurveyReader::new(settings.input.title_rows);
    let domestic = reader.read_path(&settings.input.domestic)?;
    let incoming = reader.read_path(&settings.input.incoming)?;
    let domestic_respondents = domestic.len();
    let incoming_respondents = incoming.len();
    info!(
        domestic = domestic_respondents,
        incoming = incoming_respondents,
        "survey exports loaded"
    );

    let outcome = Matcher::new()
        .with_parallel(settings.engine.parallel)
        .run(&rules, domestic, incoming)?;

    let unmatched_domestic =
        unmatched_records(&outcome.domestic, &outcome.unmatched_domestic(), &rules.identity.fr)?;
    let unmatched_incoming =
        unmatched_records(&outcome.incoming, &outcome.unmatched_incoming(), &rules.identity.ex)?;

    let summary = RunSummary {
        run_id,
        started_at,
        finished_at: Utc::now(),
        domestic_respondents,
        incoming_respondents,
        clones: outcome.domestic.clone_count() + outcome.incoming.clone_count(),
        matched: outcome.matches.len(),
        unmatched_domestic: unmatched_domestic.len(),
        unmatched_incoming: unmatched_incoming.len(),
        total_cost: outcome.total_cost(),
    };

    let outputs = ResultWriter::new(&settings.output.directory).write(&RunArtifacts {
        matches: &outcome.matches,
        unmatched_domestic: &unmatched_domestic,
        unmatched_incoming: &unmatched_incoming,
        summary: &summary,
    })?;

    info!(
        matched = summary.matched,
        unmatched_domestic = summary.unmatched_domestic,
        unmatched_incoming = summary.unmatched_incoming,
        total_cost = summary.total_cost,
        "matching run finished"
    );
    Ok(RunReport { summary, outputs })
}

fn unmatched_records(
    group: &RespondentGroup,
    rows: &[usize],
    fields: &IdentityFields,
) -> Result<Vec<UnmatchedRecord>, AppError> {
    let mut records = Vec::with_capacity(rows.len());
    for &row in rows {
        if let Some(respondent) = group.get(row) {
            records.push(fields.unmatched_record(row, respondent)?);
        }
    }
    Ok(records)
}

/// Load and validate a rules document, returning it with its layering report.
pub fn check_rules<P: AsRef<Path>>(path: P) -> Result<(MatchingRules, Vec<TierReport>), AppError> {
    let rules = MatchingRules::load(path)?;
    let report = layering_report(&rules.criteria);
    Ok((rules, report))
}

/// Compose one introduction mail per previously written match and hand them to `transport`.
pub fn send_mails<T: MailTransport>(
    rules_path: &Path,
    matches_path: &Path,
    mail: &MailSettings,
    transport: &mut T,
) -> Result<usize, AppError> {
    let rules = MatchingRules::load(rules_path)?;
    let matches = read_matches(matches_path)?;
    let mails = MailComposer::new(&rules.languages)
        .with_ascii_folding(mail.ascii_only)
        .compose_all(&matches)?;
    let delivered = transport.deliver(&mails)?;
    info!(matches = matches.len(), delivered, "mails handed to transport");
    Ok(delivered)
}
