use crate::case::codec::{document_to_tagged_json, from_json_batch, to_document};
use crate::case::model::TestCase;
use crate::case::validate::prepare;
use crate::config::ValidationRules;
use crate::error::{Error, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

pub const EXIT_INVALID: u8 = 1;
pub const EXIT_ERROR: u8 = 2;

#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct CheckReport {
    pub index: usize,
    pub name: String,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl CheckReport {
    pub fn of_success(index: usize, name: String) -> Self {
        CheckReport {
            index,
            name,
            valid: true,
            errors: vec![],
        }
    }

    pub fn from_errors(index: usize, name: String, errors: Vec<ValidationError>) -> Self {
        CheckReport {
            index,
            name,
            valid: false,
            errors,
        }
    }
}

/// Prepares every case. Returns the prepared cases that passed and one
/// report per input, in input order.
pub fn check_all(
    cases: Vec<TestCase>,
    rules: &ValidationRules,
) -> (Vec<TestCase>, Vec<CheckReport>) {
    let mut prepared = vec![];
    let mut reports = vec![];
    for (index, case) in cases.into_iter().enumerate() {
        let name = case.draft().name.trim().to_string();
        match prepare(case, rules) {
            Ok(case) => {
                prepared.push(case);
                reports.push(CheckReport::of_success(index, name));
            }
            Err(errors) => {
                reports.push(CheckReport::from_errors(index, name, errors.errors().to_vec()));
            }
        }
    }
    (prepared, reports)
}

pub fn all_valid(reports: &[CheckReport]) -> bool {
    reports.iter().all(|report| report.valid)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Report on every record.
    Check,
    /// Emit the normalized records.
    Normalize,
    /// Emit the document item of each normalized record.
    Document,
}

/// What a command writes. `stdout` is empty when nothing valid can be
/// emitted; `stderr` carries the failed reports in that case.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: Option<Value>,
    pub stderr: Option<Value>,
}

impl CommandOutput {
    pub fn exit_code(&self) -> u8 {
        if self.success {
            0
        } else {
            EXIT_INVALID
        }
    }
}

/// 0 when every record passed, 1 when some failed validation, 2 when the
/// input or rules could not be read.
pub fn exit_status(result: &Result<CommandOutput, Error>) -> u8 {
    match result {
        Ok(output) => output.exit_code(),
        Err(_) => EXIT_ERROR,
    }
}

pub fn run_command(
    command: Command,
    content: &str,
    rules: &ValidationRules,
) -> Result<CommandOutput, Error> {
    let cases = from_json_batch(content)?;
    info!("checking {} test case(s)", cases.len());
    let (prepared, reports) = check_all(cases, rules);
    let success = all_valid(&reports);
    if command == Command::Check {
        return Ok(CommandOutput {
            success,
            stdout: Some(serde_json::to_value(&reports)?),
            stderr: None,
        });
    }
    if !success {
        let failed: Vec<&CheckReport> = reports.iter().filter(|r| !r.valid).collect();
        warn!("{} of {} test case(s) failed validation", failed.len(), reports.len());
        return Ok(CommandOutput {
            success,
            stdout: None,
            stderr: Some(serde_json::to_value(&failed)?),
        });
    }
    let stdout = match command {
        Command::Document => Value::Array(
            prepared
                .iter()
                .map(|case| to_document(case).map(|item| document_to_tagged_json(&item)))
                .collect::<Result<Vec<Value>, Error>>()?,
        ),
        _ => serde_json::to_value(&prepared)?,
    };
    Ok(CommandOutput {
        success,
        stdout: Some(stdout),
        stderr: None,
    })
}
