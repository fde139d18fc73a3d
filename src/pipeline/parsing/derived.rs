//! Derived fields, computed after extraction.
//!
//! Each derived field is spliced into the schema right after `after` and is
//! filled only when extraction left it `None`.

use super::schema::fields::{BODY_MASS_INDEX, HEIGHT, WEIGHT};
use super::schema::MeasurementSet;

#[derive(Debug, Clone, Copy)]
pub struct DerivedField {
    pub name: &'static str,
    /// Field the derived column follows in output order.
    pub after: &'static str,
    pub compute: fn(&MeasurementSet) -> Option<f64>,
    /// Decimal places kept, matching how the report prints the field.
    pub decimals: i32,
}

pub const DERIVED_FIELDS: &[DerivedField] = &[DerivedField {
    name: BODY_MASS_INDEX,
    after: WEIGHT,
    compute: body_mass_index,
    decimals: 1,
}];

/// weight / height². `None` when either is missing or height is zero.
pub fn body_mass_index(set: &MeasurementSet) -> Option<f64> {
    let weight = set.get(WEIGHT)?;
    let height = set.get(HEIGHT)?;
    if height == 0.0 {
        return None;
    }
    Some(weight / (height * height))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Fill every derived field of the set's schema that is still `None`.
///
/// Returns how many fields were filled.
pub fn apply_derived_fields(set: &mut MeasurementSet) -> usize {
    let mut filled = 0;
    for derived in DERIVED_FIELDS {
        if !set.contains_field(derived.name) || set.get(derived.name).is_some() {
            continue;
        }
        if let Some(value) = (derived.compute)(set) {
            set.set(derived.name, Some(round_to(value, derived.decimals)));
            filled += 1;
        }
    }
    filled
}
