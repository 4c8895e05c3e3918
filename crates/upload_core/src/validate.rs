use std::fmt;

use crate::{CandidateFile, Constraints};

const MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    UnsupportedExtension,
    TooLarge,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::UnsupportedExtension => write!(f, "unsupported extension"),
            ValidationReason::TooLarge => write!(f, "too large"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub file_name: String,
    pub reason: ValidationReason,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub accepted: Vec<CandidateFile>,
    pub rejected: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Splits candidates into accepted and rejected, preserving input order.
///
/// Pure: the batch-size limit is not checked here.
pub fn validate(candidates: &[CandidateFile], constraints: &Constraints) -> ValidationReport {
    let mut report = ValidationReport::default();
    for candidate in candidates {
        match check(candidate, constraints) {
            Some(error) => report.rejected.push(error),
            None => report.accepted.push(candidate.clone()),
        }
    }
    report
}

fn check(candidate: &CandidateFile, constraints: &Constraints) -> Option<ValidationError> {
    let extension = extension_of(candidate.name());
    if !constraints.allows_extension(&extension) {
        let detail = if extension.is_empty() {
            "File has no extension".to_string()
        } else {
            format!("Unsupported file extension: {extension}")
        };
        return Some(ValidationError {
            file_name: candidate.name().to_string(),
            reason: ValidationReason::UnsupportedExtension,
            detail,
        });
    }

    if candidate.size_bytes() > constraints.max_file_size_bytes() {
        return Some(ValidationError {
            file_name: candidate.name().to_string(),
            reason: ValidationReason::TooLarge,
            detail: format!(
                "File size ({:.1}MB) exceeds maximum allowed size ({}MB)",
                candidate.size_bytes() as f64 / MIB,
                format_limit_mb(constraints.max_file_size_bytes()),
            ),
        });
    }

    None
}

/// Lowercased extension with a leading dot, or an empty string when there is none.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!(".{}", ext.to_ascii_lowercase()),
        _ => String::new(),
    }
}

fn format_limit_mb(bytes: u64) -> String {
    let mb = bytes as f64 / MIB;
    if mb.fract() == 0.0 {
        format!("{mb:.0}")
    } else {
        format!("{mb:.1}")
    }
}
