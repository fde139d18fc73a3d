//! Data-quality cross-validation of extracted measurements.
//!
//! Independently extracted numbers are checked against arithmetic and
//! physiological identities (`rules::RULES`). A verdict passes only when every
//! rule passes and records every failing rule, in rule order.

pub mod rules;

use std::fmt;

use serde::{Serialize, Serializer};

use crate::pipeline::parsing::MeasurementSet;

pub use rules::{approx_eq, QualityRule, RULES};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleId {
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
}

impl RuleId {
    pub const ALL: [RuleId; 10] = [
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::R8,
        Self::R9,
        Self::R10,
    ];

    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.number())
    }
}

/// Why a verdict failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCode {
    Rule(RuleId),
    /// Header text lacks the recognition keywords.
    UnrecognizedReport,
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(id) => write!(f, "{id}"),
            Self::UnrecognizedReport => write!(f, "UNRECOGNIZED_REPORT"),
        }
    }
}

impl Serialize for FailureCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityStatus {
    Pass,
    Fail,
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "Pass"),
            Self::Fail => write!(f, "Fail"),
        }
    }
}

/// Outcome of the rule battery for one measurement set.
///
/// Only built by `evaluate`; `status` is `Pass` iff `failures` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityVerdict {
    status: QualityStatus,
    failures: Vec<FailureCode>,
}

impl QualityVerdict {
    fn from_failures(failures: Vec<FailureCode>) -> Self {
        let status = if failures.is_empty() {
            QualityStatus::Pass
        } else {
            QualityStatus::Fail
        };
        Self { status, failures }
    }

    pub fn status(&self) -> QualityStatus {
        self.status
    }

    pub fn failures(&self) -> &[FailureCode] {
        &self.failures
    }

    pub fn is_pass(&self) -> bool {
        self.status == QualityStatus::Pass
    }

    /// Failure codes joined with commas, e.g. `R3,R5`.
    pub fn failures_joined(&self) -> String {
        self.failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Mark the report as unrecognized: the sentinel leads, rule failures follow.
    pub fn with_unrecognized_report(mut self) -> Self {
        if !self.failures.contains(&FailureCode::UnrecognizedReport) {
            self.failures.insert(0, FailureCode::UnrecognizedReport);
        }
        Self::from_failures(self.failures)
    }
}

// ═══════════════════════════════════════════════════════════
// Evaluation
// ═══════════════════════════════════════════════════════════

/// Run every rule against the set.
pub fn evaluate(set: &MeasurementSet) -> QualityVerdict {
    evaluate_with(RULES, set)
}

/// Run a given rule list, in order.
pub fn evaluate_with(rules: &[QualityRule], set: &MeasurementSet) -> QualityVerdict {
    let failures: Vec<FailureCode> = rules
        .iter()
        .filter(|rule| !rule.check(set))
        .map(|rule| FailureCode::Rule(rule.id))
        .collect();

    let verdict = QualityVerdict::from_failures(failures);
    tracing::debug!(
        status = %verdict.status,
        failures = %verdict.failures_joined(),
        "Quality evaluation"
    );
    verdict
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
