use crate::infra::{
    parse_timestamp, DemoPhotoUploader, InMemoryClaimRepository, InMemoryMicroActionRepository,
    InMemorySignalRepository,
};
use action_orchestrator::clock::{Clock, FixedClock, SystemClock};
use action_orchestrator::error::AppError;
use action_orchestrator::workflows::claims::{ClaimService, ClaimType, SubmissionOutcome};
use action_orchestrator::workflows::completion::{
    ChecklistItemStatus, CompletionDraft, CompletionService,
};
use action_orchestrator::workflows::evidence::{
    EvidencePolicy, EvidenceService, MemoryPreviewStore, PhotoFile, SlotState,
};
use action_orchestrator::workflows::orchestration::{
    CandidateSignals, DerivedFrom, OrchestratedAction, OrchestrationEngine, OrchestrationService,
    OrchestrationSummary, PropertyId, RawSignal, SignalCsvImporter,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Args;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_SIGNALS_CSV: &str = "\
Action ID,Title,Category,Risk Level,Exposure,Observed At,Duplicate Of,Snoozed Until,Confidence
roof-flashing,Repair roof flashing,Exterior,Critical,\"$12,000\",2025-09-28T10:00:00Z,,,
sump-pump,Test sump pump float switch,Basement,High,\"$6,500\",2025-09-27,,,
gutters,Clean gutters before winter,Exterior,Medium,,2025-09-29,,,
gutters-repeat,Clean gutters,Exterior,Medium,,2025-09-29,gutters,,
furnace,Service furnace,HVAC,High,800,2025-09-15,,2025-11-15,
smoke-detectors,Replace smoke detector batteries,Safety,Low,,2025-09-20,,,0.92
trim-paint,Touch up trim paint,Interior,Low,150,2025-03-01,,,
";

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// Signal CSV export to rank
    #[arg(long)]
    pub(crate) signals_csv: PathBuf,
    /// Property the signals belong to
    #[arg(long, default_value = "demo-property")]
    pub(crate) property_id: String,
    /// Evaluation time (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Print the summary as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Evaluation time (RFC 3339 or YYYY-MM-DD). Defaults to 2025-10-01.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Photo to attach as completion evidence. Repeatable; synthetic photos are used when absent.
    #[arg(long)]
    pub(crate) photo: Vec<PathBuf>,
    /// Number of surfaced actions to turn into micro-actions
    #[arg(long, default_value_t = 2)]
    pub(crate) seed: usize,
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let SummaryArgs {
        signals_csv,
        property_id,
        now,
        json,
    } = args;

    let signals = SignalCsvImporter::from_path(&signals_csv)?;
    let clock: Arc<dyn Clock> = match now {
        Some(now) => Arc::new(FixedClock(now)),
        None => Arc::new(SystemClock),
    };
    let property_id = PropertyId(property_id);
    let summary = summarize(&property_id, signals, clock)?;

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Summary payload unavailable: {err}"),
        }
    } else {
        render_summary(&summary);
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { now, photo, seed } = args;
    let now = now.unwrap_or_else(default_demo_time);
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(now));
    let property_id = PropertyId("demo-property".to_string());

    println!("Action orchestration demo (evaluated {now})");
    let signals = SignalCsvImporter::from_reader(Cursor::new(DEMO_SIGNALS_CSV))?;
    let summary = summarize(&property_id, signals, clock.clone())?;
    render_summary(&summary);

    println!("\nMicro-actions");
    let policy = EvidencePolicy::default();
    let completion = CompletionService::new(
        Arc::new(InMemoryMicroActionRepository::default()),
        policy,
        clock.clone(),
    );
    let seeded = match completion.seed_from_summary(&summary, seed) {
        Ok(seeded) => seeded,
        Err(err) => {
            println!("  Seeding unavailable: {err}");
            return Ok(());
        }
    };
    for action in &seeded {
        println!(
            "- {} | {} | ~{} min | {}",
            action.id, action.title, action.eta_minutes, action.status
        );
        println!("  {}", action.detail);
    }
    let Some(target) = seeded.first() else {
        println!("  Nothing surfaced; demo ends here");
        return Ok(());
    };

    println!("\nEvidence upload");
    let files = match demo_photos(&photo) {
        Ok(files) => files,
        Err(err) => {
            println!("  Unable to read photos: {err}");
            return Ok(());
        }
    };
    let evidence = EvidenceService::new(Arc::new(DemoPhotoUploader::default()), policy);
    let previews = Arc::new(MemoryPreviewStore::default());
    let mut pipeline = evidence.pipeline(previews.clone());
    let report = pipeline.add_files(files);
    println!(
        "- {} accepted, {} rejected, {} slot(s) left",
        report.accepted.len(),
        report.rejected.len(),
        pipeline.remaining_slots()
    );
    for rejection in &report.rejected {
        println!("  rejected: {rejection}");
    }
    if report.maximum_reached() {
        println!("  Maximum of {} photos reached", policy.max_photos);
    }
    pipeline.settle().await;
    for slot in pipeline.snapshot() {
        match &slot.state {
            SlotState::Committed(photo) => {
                println!("  {} -> {} ({})", slot.file_name, photo.id, photo.thumbnail_url)
            }
            SlotState::Failed { reason } => println!("  {} failed: {reason}", slot.file_name),
            SlotState::Draft => println!("  {} still uploading", slot.file_name),
        }
    }
    let photo_ids = pipeline
        .committed_ids()
        .into_iter()
        .map(|id| id.0)
        .collect::<Vec<_>>();
    drop(pipeline);
    println!("- {} preview(s) still held", previews.live_count());

    println!("\nCompletion");
    let draft = CompletionDraft {
        completed_at: now - Duration::hours(2),
        cost: Some(1450.0),
        did_it_myself: false,
        service_provider_name: Some("Summit Roofing".to_string()),
        service_provider_rating: Some(5),
        notes: "Resealed flashing around the chimney".to_string(),
        photo_ids,
    };
    for attempt in ["first", "retry"] {
        match completion.complete_action(&target.id, draft.clone()) {
            Ok(transition) => println!(
                "- {attempt}: {} -> {} (changed: {}) | {}",
                transition.action.id,
                transition.action.status,
                transition.changed,
                transition.notice.message
            ),
            Err(err) => println!("- {attempt}: rejected: {err}"),
        }
    }

    println!("\nClaim gating");
    run_claim_demo(property_id, clock);
    Ok(())
}

/// The embedded signals are dated around this instant.
fn default_demo_time() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 10, 1)
        .and_then(|date| date.and_hms_opt(9, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now)
}

fn run_claim_demo(property_id: PropertyId, clock: Arc<dyn Clock>) {
    let claims = ClaimService::new(Arc::new(InMemoryClaimRepository::default()), clock);
    let claim = match claims.open_claim(property_id, ClaimType::WaterDamage) {
        Ok(update) => update.claim,
        Err(err) => {
            println!("  Claim unavailable: {err}");
            return;
        }
    };
    println!(
        "- Opened {} ({} checklist items)",
        claim.id,
        claim.checklist.items.len()
    );

    match claims.attempt_claim_submission(&claim.id) {
        Ok(result) => {
            println!("- First attempt: {}", result.notice.message);
            if let SubmissionOutcome::Blocked { blocking, .. } = &result.outcome {
                for item in blocking {
                    println!("  blocking: {} ({} doc(s) missing)", item.title, item.missing_docs);
                }
            }
        }
        Err(err) => println!("- First attempt failed: {err}"),
    }

    for item in claim.checklist.items.iter().filter(|item| item.required) {
        for _ in 0..item.missing_docs {
            if let Err(err) = claims.record_document(&claim.id, &item.id) {
                println!("  Unable to record document for {}: {err}", item.title);
            }
        }
        if let Err(err) = claims.set_item_status(&claim.id, &item.id, ChecklistItemStatus::Done) {
            println!("  Unable to complete {}: {err}", item.title);
        }
    }

    match claims.attempt_claim_submission(&claim.id) {
        Ok(result) => match result.outcome {
            SubmissionOutcome::Submitted(claim) => {
                println!("- Second attempt: {} ({})", result.notice.message, claim.status)
            }
            SubmissionOutcome::Blocked { blocking, .. } => {
                println!("- Second attempt still blocked by {} item(s)", blocking.len())
            }
        },
        Err(err) => println!("- Second attempt failed: {err}"),
    }
}

fn summarize(
    property_id: &PropertyId,
    signals: Vec<RawSignal>,
    clock: Arc<dyn Clock>,
) -> Result<OrchestrationSummary, AppError> {
    let repository = Arc::new(InMemorySignalRepository::default());
    repository
        .replace(
            property_id.clone(),
            CandidateSignals {
                signals,
                derived_from: DerivedFrom {
                    risk_assessment: true,
                    financial_exposure: true,
                    maintenance: true,
                    checklist: false,
                },
                ..CandidateSignals::default()
            },
        )
        .map_err(|err| AppError::Orchestration(err.into()))?;

    let service = OrchestrationService::new(repository, OrchestrationEngine::default(), clock);
    Ok(service.compute_orchestration_summary(property_id)?)
}

fn demo_photos(paths: &[PathBuf]) -> std::io::Result<Vec<PhotoFile>> {
    if paths.is_empty() {
        return Ok(vec![
            PhotoFile::new("before.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0]),
            PhotoFile::new("after.png", "image/png", vec![0x89, 0x50, 0x4E, 0x47]),
            PhotoFile::new("invoice.pdf", "application/pdf", b"%PDF-1.7".to_vec()),
        ]);
    }

    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)?;
            let content_type = mime_guess::from_path(path).first_or_octet_stream();
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(PhotoFile::new(file_name, content_type.essence_str(), bytes))
        })
        .collect()
}

fn render_summary(summary: &OrchestrationSummary) {
    println!(
        "Property {}: {} pending action(s)",
        summary.property_id, summary.pending_action_count
    );

    println!("\nRecommended actions");
    if summary.actions.is_empty() {
        println!("- none");
    }
    for action in &summary.actions {
        render_action(action);
    }

    if !summary.snoozed_actions.is_empty() {
        println!("\nSnoozed");
        for action in &summary.snoozed_actions {
            render_action(action);
        }
    }

    if !summary.suppressed_actions.is_empty() {
        println!("\nSuppressed");
        for action in &summary.suppressed_actions {
            println!(
                "- {} | {} | {}",
                action.id,
                action.title,
                action.suppression.summary()
            );
        }
    }
}

fn render_action(action: &OrchestratedAction) {
    let exposure = match action.exposure {
        Some(amount) => format!("${amount:.0}"),
        None => "n/a".to_string(),
    };
    println!(
        "- {} | {} | risk {} | exposure {} | confidence {}",
        action.id,
        action.title,
        action.risk_level,
        exposure,
        action.score()
    );
    if let Some(confidence) = &action.confidence {
        for line in &confidence.explanation {
            println!("  * {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_now() -> DateTime<Utc> {
        default_demo_time()
    }

    #[test]
    fn embedded_signals_produce_a_ranked_summary() {
        let signals = SignalCsvImporter::from_reader(Cursor::new(DEMO_SIGNALS_CSV))
            .expect("embedded csv parses");
        let summary = summarize(
            &PropertyId("demo-property".to_string()),
            signals,
            Arc::new(FixedClock(demo_now())),
        )
        .expect("summary computes");

        assert_eq!(summary.actions[0].id.0, "roof-flashing");
        assert!(summary
            .snoozed_actions
            .iter()
            .any(|action| action.id.0 == "furnace"));
        assert!(summary
            .suppressed_actions
            .iter()
            .any(|action| action.id.0 == "gutters-repeat"));
        assert!(summary
            .suppressed_actions
            .iter()
            .any(|action| action.id.0 == "trim-paint"));
    }

    #[test]
    fn synthetic_photos_include_one_rejectable_file() {
        let files = demo_photos(&[]).expect("synthetic photos");
        assert_eq!(files.len(), 3);
        assert!(files
            .iter()
            .any(|file| !file.content_type.starts_with("image/")));
    }

    #[tokio::test]
    async fn demo_runs_end_to_end_without_photos() {
        run_demo(DemoArgs {
            now: Some(demo_now()),
            photo: Vec::new(),
            seed: 2,
        })
        .await
        .expect("demo completes");
    }
}
