use crate::infra::CatalogArgs;
use chrono::{Local, NaiveDate};
use clap::Args;
use joint_assessment::error::AppError;
use joint_assessment::workflows::assessment::{
    AssessmentEvent, AssessmentInstance, AssessmentOutcome, AssessmentSnapshot, ClinicalField,
};
use joint_assessment::workflows::findings::JointFindingImporter;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
    /// Date stamped on the outcome (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) assessed_on: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ReplayArgs {
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
    /// JSON file holding an array of assessment events
    #[arg(long)]
    pub(crate) events: PathBuf,
    /// Date stamped on the outcome (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) assessed_on: Option<NaiveDate>,
    /// Emit the snapshot and outcome as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
    /// CSV export with Finding, Region, Joint and Value columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Date stamped on the outcome (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) assessed_on: Option<NaiveDate>,
    /// Compute the score after importing instead of stopping at the clinical step
    #[arg(long)]
    pub(crate) score: bool,
}

/// Accepts either a bare event array or the `{"events": [...]}` body the HTTP API takes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventFile {
    Bare(Vec<AssessmentEvent>),
    Wrapped { events: Vec<AssessmentEvent> },
}

impl EventFile {
    fn into_events(self) -> Vec<AssessmentEvent> {
        match self {
            EventFile::Bare(events) | EventFile::Wrapped { events } => events,
        }
    }
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let catalog = args.load()?;
    println!("Region catalog ({} regions)", catalog.region_count());
    for (index, region) in catalog.regions().iter().enumerate() {
        println!("  {}. {}: {}", index + 1, region.name, region.joints.join(", "));
    }
    Ok(())
}

pub(crate) fn run_replay(args: ReplayArgs) -> Result<(), AppError> {
    let catalog = args.catalog.load()?;
    let reader = BufReader::new(File::open(&args.events)?);
    let events = serde_json::from_reader::<_, EventFile>(reader)?.into_events();
    let instance = AssessmentInstance::replay(catalog, events)?;
    let assessed_on = args.assessed_on.unwrap_or_else(today);

    if args.json {
        let payload = serde_json::json!({
            "snapshot": instance.snapshot(),
            "outcome": instance.outcome(assessed_on),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    print_snapshot(&instance.snapshot());
    if let Some(outcome) = instance.outcome(assessed_on) {
        print_outcome(&outcome);
    }
    Ok(())
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let catalog = args.catalog.load()?;
    let mut instance = JointFindingImporter::from_path(&args.csv, catalog)?;
    if args.score {
        instance.compute_score();
    }

    print_snapshot(&instance.snapshot());
    if let Some(outcome) = instance.outcome(args.assessed_on.unwrap_or_else(today)) {
        print_outcome(&outcome);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let catalog = args.catalog.load()?;
    let mut instance = AssessmentInstance::new(catalog);
    let assessed_on = args.assessed_on.unwrap_or_else(today);

    println!("Joint assessment walkthrough");
    println!("============================");

    for event in demo_script() {
        // Scripted joints may be missing from a custom catalog; show the rejection and move on.
        if let Err(err) = instance.apply(event.clone()) {
            println!("! {} rejected: {err}", event.kind());
            continue;
        }
        if matches!(event, AssessmentEvent::Advance | AssessmentEvent::Retreat) {
            print_snapshot(&instance.snapshot());
        }
    }

    if let Some(outcome) = instance.outcome(assessed_on) {
        print_outcome(&outcome);
    }
    Ok(())
}

fn demo_script() -> Vec<AssessmentEvent> {
    vec![
        AssessmentEvent::Advance,
        AssessmentEvent::select_joint("Shoulder"),
        AssessmentEvent::select_joint("Wrist"),
        AssessmentEvent::Advance,
        AssessmentEvent::select_joint("MCP"),
        AssessmentEvent::Advance,
        AssessmentEvent::select_joint("Knee"),
        AssessmentEvent::Advance,
        AssessmentEvent::Advance,
        AssessmentEvent::Advance,
        AssessmentEvent::Advance,
        AssessmentEvent::select_joint("MCP"),
        AssessmentEvent::Advance,
        AssessmentEvent::select_joint("Knee"),
        AssessmentEvent::Advance,
        AssessmentEvent::Advance,
        AssessmentEvent::Retreat,
        AssessmentEvent::Advance,
        AssessmentEvent::SetClinicalInput {
            field: ClinicalField::Pga,
            value: 55.0,
        },
        AssessmentEvent::SetClinicalInput {
            field: ClinicalField::Ega,
            value: 40.0,
        },
        AssessmentEvent::SetClinicalInput {
            field: ClinicalField::Crp,
            value: 6.2,
        },
        AssessmentEvent::ComputeScore,
    ]
}

fn print_snapshot(snapshot: &AssessmentSnapshot) {
    println!();
    println!("[{}] {}", snapshot.phase_label, snapshot.title);
    if let Some(region) = &snapshot.region {
        println!("  {}: {}", region.position_label, region.prompt);
        for joint in &region.joints {
            let mark = if joint.selected { "x" } else { " " };
            println!("    [{mark}] {}", joint.name);
        }
        println!("  Selected so far: {}", region.selected_count);
    } else {
        println!(
            "  Tender: {}  Swollen: {}",
            snapshot.tender_count, snapshot.swollen_count
        );
        for input in &snapshot.clinical_inputs {
            println!("  {}: {}", input.label, input.display);
        }
    }
    if let Some(score) = snapshot.score {
        println!("  Score: {score}");
    }
    let back = if snapshot.navigation.can_retreat {
        "Back | "
    } else {
        ""
    };
    println!("  {back}{}", snapshot.navigation.primary_label);
}

fn print_outcome(outcome: &AssessmentOutcome) {
    println!();
    println!("Assessment results ({})", outcome.assessed_on);
    for line in outcome.summary_lines() {
        println!("  {line}");
    }
    if !outcome.tender_joints.is_empty() {
        println!("  Tender: {}", outcome.tender_joints.join(", "));
    }
    if !outcome.swollen_joints.is_empty() {
        println!("  Swollen: {}", outcome.swollen_joints.join(", "));
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use joint_assessment::workflows::assessment::{
        AssessmentPhase, DiseaseActivity, JointCatalog,
    };
    use std::sync::Arc;

    #[test]
    fn event_files_accept_bare_and_wrapped_arrays() {
        let bare: EventFile =
            serde_json::from_str(r#"[{"type":"advance"},{"type":"retreat"}]"#).expect("bare");
        assert_eq!(bare.into_events().len(), 2);

        let wrapped: EventFile = serde_json::from_str(
            r#"{"events":[{"type":"select_joint","joint":"Knee"}],"assessed_on":"2025-10-02"}"#,
        )
        .expect("wrapped");
        assert_eq!(
            wrapped.into_events(),
            vec![AssessmentEvent::select_joint("Knee")]
        );
    }

    #[test]
    fn demo_script_ends_with_a_scored_assessment() {
        let instance = AssessmentInstance::replay(
            Arc::new(JointCatalog::standard()),
            demo_script(),
        )
        .expect("script replays against the standard catalog");

        assert_eq!(instance.phase(), AssessmentPhase::Results);
        let date = NaiveDate::from_ymd_opt(2025, 10, 2).expect("valid date");
        let outcome = instance.outcome(date).expect("outcome");
        // 4 tender + 2 swollen + 5.5 + 4.0 + 6.2
        assert_eq!(outcome.score, 21.7);
        assert_eq!(outcome.disease_activity, DiseaseActivity::Moderate);
    }
}
