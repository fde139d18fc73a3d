//! The fixed battery of cross-validation rules.
//!
//! Each rule names the fields it needs. A rule with any of them missing
//! fails: an identity that cannot be verified is not trusted.

use crate::pipeline::parsing::fields::*;
use crate::pipeline::parsing::MeasurementSet;

use super::RuleId;

/// Absorbs floating-point representation error at the tolerance boundary.
const EPSILON: f64 = 1e-9;

/// `|computed - expected| <= tolerance`, with `EPSILON` slack.
pub fn approx_eq(computed: f64, expected: f64, tolerance: f64) -> bool {
    (computed - expected).abs() <= tolerance + EPSILON
}

pub struct QualityRule {
    pub id: RuleId,
    pub description: &'static str,
    /// Fields the predicate reads, in the order it receives them.
    pub required: &'static [&'static str],
    predicate: fn(&[f64]) -> bool,
}

impl QualityRule {
    /// Run the rule. Missing inputs fail it.
    pub fn check(&self, set: &MeasurementSet) -> bool {
        let values: Option<Vec<f64>> = self.required.iter().map(|name| set.get(name)).collect();
        match values {
            Some(values) => (self.predicate)(&values),
            None => false,
        }
    }
}

impl std::fmt::Debug for QualityRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityRule")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish()
    }
}

/// All rules, in evaluation order.
pub static RULES: &[QualityRule] = &[
    QualityRule {
        id: RuleId::R1,
        description: "fat mass + fat-free mass = weight",
        required: &[FAT_MASS_KG, FAT_FREE_MASS_KG, WEIGHT],
        predicate: |v| approx_eq(v[0] + v[1], v[2], 0.01),
    },
    QualityRule {
        id: RuleId::R2,
        description: "fat mass % + fat-free mass % = 100",
        required: &[FAT_MASS_PCT, FAT_FREE_MASS_PCT],
        predicate: |v| approx_eq(v[0] + v[1], 100.0, 0.01),
    },
    QualityRule {
        id: RuleId::R3,
        description: "FMI + FFMI = BMI",
        required: &[FAT_MASS_INDEX, FAT_FREE_MASS_INDEX, BODY_MASS_INDEX],
        predicate: |v| approx_eq(v[0] + v[1], v[2], 0.2),
    },
    QualityRule {
        id: RuleId::R4,
        description: "segmental muscle mass sums to skeletal muscle mass",
        required: &[
            RIGHT_ARM_SMM,
            LEFT_ARM_SMM,
            RIGHT_LEG_SMM,
            LEFT_LEG_SMM,
            TORSO_SMM,
            SKELETAL_MUSCLE_MASS,
        ],
        predicate: |v| approx_eq(v[..5].iter().sum(), v[5], 0.3),
    },
    QualityRule {
        id: RuleId::R5,
        description: "weight / height^2 = BMI",
        required: &[WEIGHT, HEIGHT, BODY_MASS_INDEX],
        predicate: |v| v[1] != 0.0 && approx_eq(v[0] / (v[1] * v[1]), v[2], 0.4),
    },
    QualityRule {
        id: RuleId::R6,
        description: "ECW (L) / TBW (L) = ECW/TBW",
        required: &[EXTRACELLULAR_WATER_L, TOTAL_BODY_WATER_L, ECW_TBW_PCT],
        predicate: |v| v[1] != 0.0 && approx_eq(v[0] / v[1] * 100.0, v[2], 0.2),
    },
    QualityRule {
        id: RuleId::R7,
        description: "ECW (%) / TBW (%) = ECW/TBW",
        required: &[EXTRACELLULAR_WATER_PCT, TOTAL_BODY_WATER_PCT, ECW_TBW_PCT],
        predicate: |v| v[1] != 0.0 && approx_eq(v[0] / v[1] * 100.0, v[2], 0.2),
    },
    QualityRule {
        id: RuleId::R8,
        description: "REE x PAL = energy consumption",
        required: &[
            RESTING_ENERGY_EXPENDITURE,
            PHYSICAL_ACTIVITY_LEVEL,
            ENERGY_CONSUMPTION,
        ],
        predicate: |v| approx_eq(v[0] * v[1], v[2], 0.01),
    },
    QualityRule {
        id: RuleId::R9,
        description: "atan(Xc / R) = phase angle",
        required: &[REACTANCE, RESISTANCE, PHASE_ANGLE],
        predicate: |v| v[1] != 0.0 && approx_eq((v[0] / v[1]).atan().to_degrees(), v[2], 0.1),
    },
    QualityRule {
        id: RuleId::R10,
        description: "phase angle percentile within [0, 100]",
        required: &[PHASE_ANGLE_PERCENTILE],
        predicate: |v| (0.0..=100.0).contains(&v[0]),
    },
];
