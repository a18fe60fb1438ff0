//! Command-line surface of the `risk-triage` binary.
//!
//! Every command prints JSON on stdout. Parsing is separate from execution
//! so the dispatch can be tested without touching the user's database.

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{self, RiskConfig};
use crate::db::{self, DatabaseError};
use crate::journal::{self, SymptomEntry};
use crate::models::enums::SymptomKind;
use crate::models::symptom::MAX_SEVERITY;
use crate::models::Patient;
use crate::risk::{RiskEngine, RiskError, SqliteSource};
use crate::state::RiskState;

const NOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Risk(#[from] RiskError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot encode output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Text for stderr. Risk errors use the patient-facing wording.
    pub fn user_message(&self) -> String {
        match self {
            Self::Risk(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    /// True when the named patient or log does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Risk(RiskError::PatientNotFound(_))
                | Self::Risk(RiskError::Database(DatabaseError::NotFound { .. }))
                | Self::Database(DatabaseError::NotFound { .. })
        )
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "risk-triage",
    version,
    about = "Patient risk scoring over recent symptom history",
    long_about = "risk-triage keeps a per-patient symptom journal and scores each patient's\n\
        risk from it: critical-symptom override, symptom-burden override, then the\n\
        trained classifier.\n\n\
        The database defaults to ~/RiskTriage/risk.db (override with RISK_TRIAGE_DB);\n\
        thresholds come from the JSON file named by RISK_TRIAGE_CONFIG."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score a patient and print the dashboard
    Evaluate(EvaluateArgs),

    /// Create a patient profile
    #[command(name = "add-patient")]
    AddPatient(AddPatientArgs),

    /// Log a symptom for a patient
    Log(LogArgs),

    /// Change the severity of a logged symptom
    Edit(EditArgs),

    /// Delete a logged symptom
    Delete(DeleteArgs),

    /// Print a patient's symptom history grouped by day
    History(HistoryArgs),

    /// Print the symptom catalog
    Catalog,
}

#[derive(Debug, Args, Clone)]
pub struct EvaluateArgs {
    #[arg(value_name = "PATIENT_ID")]
    pub patient_id: Uuid,

    /// Evaluation time, "YYYY-MM-DD HH:MM:SS" (defaults to now)
    #[arg(long, value_parser = parse_now)]
    pub now: Option<NaiveDateTime>,
}

#[derive(Debug, Args, Clone)]
pub struct AddPatientArgs {
    #[arg(value_name = "FULL_NAME")]
    pub full_name: String,

    #[arg(long)]
    pub age: Option<i32>,
}

#[derive(Debug, Args, Clone)]
pub struct LogArgs {
    #[arg(value_name = "PATIENT_ID")]
    pub patient_id: Uuid,

    /// Catalog key, e.g. "joint pain" or joint_pain
    #[arg(value_name = "SYMPTOM", value_parser = parse_symptom)]
    pub symptom: SymptomKind,

    #[arg(long, default_value_t = 1, value_parser = parse_severity)]
    pub severity: u8,

    /// Day the symptom occurred, "YYYY-MM-DD" (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct EditArgs {
    #[arg(value_name = "PATIENT_ID")]
    pub patient_id: Uuid,

    #[arg(value_name = "LOG_ID")]
    pub log_id: Uuid,

    #[arg(long, value_parser = parse_severity)]
    pub severity: u8,
}

#[derive(Debug, Args, Clone)]
pub struct DeleteArgs {
    #[arg(value_name = "PATIENT_ID")]
    pub patient_id: Uuid,

    #[arg(value_name = "LOG_ID")]
    pub log_id: Uuid,
}

#[derive(Debug, Args, Clone)]
pub struct HistoryArgs {
    #[arg(value_name = "PATIENT_ID")]
    pub patient_id: Uuid,
}

fn parse_now(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, NOW_FORMAT)
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM:SS\": {e}"))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_symptom(value: &str) -> Result<SymptomKind, String> {
    value
        .replace('_', " ")
        .parse::<SymptomKind>()
        .map_err(|_| format!("unknown symptom {value:?}; run `risk-triage catalog` for keys"))
}

fn parse_severity(value: &str) -> Result<u8, String> {
    let severity: u8 = value.parse().map_err(|e| format!("{e}"))?;
    if severity > MAX_SEVERITY {
        return Err(format!("severity must be within 0..={MAX_SEVERITY}"));
    }
    Ok(severity)
}

/// Outcome of commands that only confirm a write.
#[derive(Debug, Serialize)]
struct Ack {
    log_id: Uuid,
    status: &'static str,
}

fn open_store() -> Result<Connection, CliError> {
    let path = config::database_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = db::open_database(&path)?;
    tracing::info!(path = %path.display(), "Database opened");
    Ok(conn)
}

/// Run one parsed command and return its JSON output.
pub fn execute(command: Command) -> Result<String, CliError> {
    if let Command::Catalog = command {
        return Ok(serde_json::to_string_pretty(&journal::symptom_catalog())?);
    }
    let conn = open_store()?;
    execute_with(command, &conn)
}

fn execute_with(command: Command, conn: &Connection) -> Result<String, CliError> {
    let json = match command {
        Command::Evaluate(args) => {
            let config = RiskConfig::from_env().map_err(RiskError::from)?;
            let state = Arc::new(RiskState::initialize(config)?);
            tracing::info!(degraded = state.is_degraded(), "Risk state ready");

            let engine = RiskEngine::new(state);
            let now = args.now.unwrap_or_else(|| Local::now().naive_local());
            let dashboard = engine.dashboard(&SqliteSource::new(conn), &args.patient_id, now)?;
            serde_json::to_string_pretty(&dashboard)?
        }
        Command::AddPatient(args) => {
            let patient = Patient {
                id: Uuid::new_v4(),
                full_name: args.full_name,
                age: args.age,
            };
            db::insert_patient(conn, &patient)?;
            tracing::info!(patient_id = %patient.id, "Patient created");
            serde_json::to_string_pretty(&patient)?
        }
        Command::Log(args) => {
            let entry = SymptomEntry {
                symptom: args.symptom,
                severity: args.severity,
                date_logged: args.date,
            };
            let log_id = journal::record_symptom(conn, &args.patient_id, &entry)?;
            serde_json::to_string_pretty(&Ack {
                log_id,
                status: "logged",
            })?
        }
        Command::Edit(args) => {
            journal::update_severity(conn, &args.patient_id, &args.log_id, args.severity)?;
            serde_json::to_string_pretty(&Ack {
                log_id: args.log_id,
                status: "updated",
            })?
        }
        Command::Delete(args) => {
            journal::delete_symptom(conn, &args.patient_id, &args.log_id)?;
            serde_json::to_string_pretty(&Ack {
                log_id: args.log_id,
                status: "deleted",
            })?
        }
        Command::History(args) => {
            serde_json::to_string_pretty(&journal::history_by_date(conn, &args.patient_id)?)?
        }
        Command::Catalog => serde_json::to_string_pretty(&journal::symptom_catalog())?,
    };
    Ok(json)
}
