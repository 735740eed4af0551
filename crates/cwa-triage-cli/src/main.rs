//! Command-line driver for the CWA triage workflow.
//!
//! Runs against the builtin sample data unless `CWA_API_BASE_URL` (or
//! `--api-url`) points at a prediction service.
//!
//! # Environment Variables
//! - `CWA_API_BASE_URL`: Prediction service base URL (unset: local mode)
//! - `CWA_API_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
//! - `CWA_REPORT_DIR`: Directory exported reports are written to (default: ".")
//! - `RUST_LOG`: Log filter (default: "cwa_triage=info")

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cwa_triage_core::handoff::DiagnosisHandoff;
use cwa_triage_core::session::report_request_from_handoff;
use cwa_triage_core::{
    export_report, DemographicContext, ExportFormat, Fetched, MatchOutcome, ReportHandoff,
    MatchMode, ReportRequest, SymptomSelection, TreatmentHandoff, TreatmentOutcome, TriageConfig,
    TriageEngine, Vitals, EMERGENCY_PROTOCOL,
};

#[derive(Parser)]
#[command(name = "cwa-triage")]
#[command(about = "Chemical warfare agent symptom triage")]
struct Cli {
    /// Prediction service base URL (overrides CWA_API_BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Report output directory (overrides CWA_REPORT_DIR)
    #[arg(long, global = true)]
    report_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List selectable symptoms
    Symptoms {
        /// Only symptoms of this body system
        #[arg(long)]
        system: Option<String>,
    },
    /// List known agents
    Agents,
    /// Match symptoms to candidate agents
    Diagnose {
        /// Symptom names (comma-separated or repeated)
        #[arg(value_delimiter = ',')]
        symptoms: Vec<String>,
        #[arg(long)]
        gender: Option<String>,
        /// Affected body system
        #[arg(long)]
        system: Option<String>,
        /// Diagnosis handoff query string instead of the arguments above
        #[arg(long)]
        from_query: Option<String>,
        /// Measurements forwarded to the prediction service
        #[command(flatten)]
        vitals: VitalsArgs,
    },
    /// Show treatment for an agent
    Treatment {
        /// Exact agent name
        agent: Option<String>,
        /// Treatment handoff query string
        #[arg(long)]
        from_query: Option<String>,
    },
    /// Compose and export a case report
    Report {
        /// Diagnosed agent
        #[arg(long)]
        agent: Option<String>,
        /// Observed symptoms (comma-separated or repeated)
        #[arg(long, value_delimiter = ',')]
        symptoms: Vec<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        system: Option<String>,
        /// Clinician name (blank prints as N/A)
        #[arg(long, default_value = "")]
        clinician: String,
        /// pdf, txt or json
        #[arg(long, default_value = "pdf")]
        format: String,
        /// Report handoff query string (agent, symptoms, context and medicines)
        #[arg(long)]
        from_query: Option<String>,
    },
    /// Print the general emergency protocol
    Protocol,
}

/// Optional vitals; only a remote classifier uses them.
#[derive(Args, Debug, Default)]
struct VitalsArgs {
    #[arg(long)]
    age: Option<f64>,
    /// Systolic blood pressure (mmHg)
    #[arg(long)]
    systolic_bp: Option<f64>,
    #[arg(long)]
    weight_kg: Option<f64>,
    /// Oxygen saturation (%)
    #[arg(long)]
    oxygen: Option<f64>,
    /// Breaths per minute
    #[arg(long)]
    respiratory: Option<f64>,
    #[arg(long)]
    heart_rate: Option<f64>,
}

impl From<VitalsArgs> for Vitals {
    fn from(args: VitalsArgs) -> Self {
        Vitals {
            age: args.age,
            systolic_bp: args.systolic_bp,
            weight_kg: args.weight_kg,
            oxygen: args.oxygen,
            respiratory: args.respiratory,
            heart_rate: args.heart_rate,
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cwa_triage=info".parse()?)
                .add_directive("cwa_triage_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = TriageConfig::from_env().context("Invalid configuration")?;
    if let Some(url) = cli.api_url {
        config = config.with_api_base_url(url)?;
    }
    if let Some(dir) = cli.report_dir {
        config = config.with_report_dir(dir);
    }

    let engine = TriageEngine::from_config(&config)?;

    match cli.command {
        Commands::Symptoms { system } => {
            match engine.symptoms(system.as_deref())? {
                Fetched::Found(catalog) => {
                    for symptom in catalog.symptoms() {
                        match &symptom.body_system {
                            Some(system) => println!("{:<24} {}", symptom.name, system),
                            None => println!("{}", symptom.name),
                        }
                    }
                }
                Fetched::NothingFound => println!("No symptoms found."),
            }
        }
        Commands::Agents => match engine.agents()? {
            Fetched::Found(directory) => {
                for agent in directory.agents() {
                    match (&agent.classification, &agent.risk) {
                        (Some(class), Some(risk)) => {
                            println!("{:<20} {:<11} risk: {}", agent.name, class.to_string(), risk)
                        }
                        _ => println!("{}", agent.name),
                    }
                }
            }
            Fetched::NothingFound => println!("No agents found."),
        },
        Commands::Diagnose {
            symptoms,
            gender,
            system,
            from_query,
            vitals,
        } => {
            let handoff = match from_query {
                Some(query) => DiagnosisHandoff::from_query(&query),
                None => DiagnosisHandoff {
                    symptoms,
                    gender,
                    system,
                },
            };
            let selection = build_selection(&engine, &handoff, vitals.into());
            diagnose(&engine, &selection)?;
        }
        Commands::Treatment { agent, from_query } => {
            let agent = match (agent, from_query) {
                (Some(agent), _) => agent,
                (None, Some(query)) => match TreatmentHandoff::from_query(&query) {
                    Some(handoff) => handoff.agent,
                    None => bail!("The handoff query has no agent"),
                },
                (None, None) => bail!("Give an agent name or --from-query"),
            };
            show_treatment(&engine, &agent)?;
        }
        Commands::Report {
            agent,
            symptoms,
            gender,
            system,
            clinician,
            format,
            from_query,
        } => {
            let format: ExportFormat = format.parse()?;
            let request = match (from_query, agent) {
                (Some(query), _) => match ReportHandoff::from_query(&query) {
                    Some(handoff) => {
                        report_request_from_handoff(&handoff, engine.directory(), &clinician)
                    }
                    None => bail!("The handoff query has no agent"),
                },
                (None, Some(agent)) => {
                    let medicines = engine
                        .directory()
                        .get(&agent)
                        .map(|a| a.medicines.clone())
                        .unwrap_or_default();
                    ReportRequest::new(agent)
                        .with_symptoms(symptoms)
                        .with_context(DemographicContext::new(gender, system))
                        .with_medicines(medicines)
                        .with_clinician(clinician)
                }
                (None, None) => bail!("Give --agent or --from-query"),
            };

            let report = engine.compose_report(request)?;
            let Some(document) = export_report(Some(&report), format)? else {
                return Ok(());
            };
            let path = document
                .write_to(config.report_dir())
                .context("Failed to write report")?;
            println!("Case ID: {}", report.case_id);
            println!("Written: {}", path.display());
            println!("SHA-256: {}", document.sha256);
        }
        Commands::Protocol => {
            for (i, step) in EMERGENCY_PROTOCOL.iter().enumerate() {
                println!("{}. {}", i + 1, step);
            }
        }
    }

    Ok(())
}

/// Turn entered symptoms into a selection.
///
/// Local mode canonicalizes names against the builtin catalog and warns on
/// unknown ones. Remote mode passes names through unchanged.
fn build_selection(
    engine: &TriageEngine,
    handoff: &DiagnosisHandoff,
    vitals: Vitals,
) -> SymptomSelection {
    let mut selection = SymptomSelection::new();
    for entered in &handoff.symptoms {
        if engine.mode() == MatchMode::Remote {
            selection.select(entered);
            continue;
        }

        let catalog = engine.catalog();
        match catalog.canonicalize(entered) {
            Some(name) => selection.select(name),
            None => {
                let suggestions = catalog.suggest(entered, 3);
                if suggestions.is_empty() {
                    warn!(symptom = %entered, "symptom not in catalog");
                } else {
                    warn!(
                        symptom = %entered,
                        "symptom not in catalog, did you mean: {}",
                        suggestions.join(", ")
                    );
                }
                selection.select(entered);
            }
        }
    }
    selection.set_context(DemographicContext::new(
        handoff.gender.clone(),
        handoff.system.clone(),
    ));
    selection.set_vitals(vitals);
    selection
}

/// Match the selection and print candidates with their handoff queries.
fn diagnose(engine: &TriageEngine, selection: &SymptomSelection) -> anyhow::Result<()> {
    let diagnosis = engine.diagnose(selection)?;
    match &diagnosis.outcome {
        MatchOutcome::NoSymptoms => {
            println!("No symptoms selected.");
            return Ok(());
        }
        MatchOutcome::NoMatch => {
            println!("No agent matches the selected symptoms.");
            return Ok(());
        }
        MatchOutcome::Ranked(ranked) => {
            for (i, candidate) in ranked.iter().enumerate() {
                println!(
                    "{}. {} (score {:.2}; matched: {})",
                    i + 1,
                    candidate.agent.name,
                    candidate.score,
                    candidate.matched_symptoms.join(", ")
                );
                if let Some(action) = &candidate.agent.action {
                    println!("   {}", action);
                }
            }
        }
        MatchOutcome::Predicted(result) => {
            println!("Predicted agent: {} (score {:.2})", result.agent, result.score);
            for line in result.medicines.display_lines() {
                println!("   {}", line);
            }
        }
    }

    if let Some(chosen) = diagnosis.choose_best() {
        println!();
        println!("Treatment handoff: ?{}", chosen.to_treatment_handoff().to_query());
        println!("Report handoff:    ?{}", chosen.to_report_handoff().to_query());
    }
    Ok(())
}

fn show_treatment(engine: &TriageEngine, agent: &str) -> anyhow::Result<()> {
    match engine.resolve_treatment(agent)? {
        TreatmentOutcome::Protocol(protocol) => {
            println!("{} Treatment", protocol.agent);
            if let Some(action) = &protocol.action {
                println!("Suggested action: {}", action);
            }
            for (i, step) in protocol.steps.iter().enumerate() {
                println!("{}. {}", i + 1, step);
            }
            let doses = protocol.medicines.display_lines();
            if !doses.is_empty() {
                println!("Initial doses:");
                for line in doses {
                    println!("  - {}", line);
                }
            }
        }
        TreatmentOutcome::Details(table) => {
            println!("{} Treatment Details", table.agent);
            println!("{}", table.display_headers().join(" | "));
            for row in table.display_rows() {
                println!("{}", row.join(" | "));
            }
        }
        TreatmentOutcome::NoTreatmentData => {
            println!("No treatment data found for this agent.");
        }
    }
    Ok(())
}
