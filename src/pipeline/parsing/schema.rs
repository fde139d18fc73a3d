//! Measurement schema: the closed, versioned, ordered list of output fields.
//!
//! The report layout is data: `POSITIONAL_LAYOUT` lists the numerals of the
//! measurement block in reading order. Derived fields are spliced into that
//! order by `MeasurementSchema::splice`, each right after its source field.

use std::sync::LazyLock;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::derived::{DerivedField, DERIVED_FIELDS};

/// Column names. Also the keys used by the quality rules.
pub mod fields {
    pub const FAT_MASS_KG: &str = "Fat Mass (kg)";
    pub const FAT_MASS_PCT: &str = "Fat Mass (%)";
    pub const FAT_MASS_INDEX: &str = "Fat Mass Index (kg/m^2)";
    pub const FAT_FREE_MASS_KG: &str = "Fat-Free Mass (kg)";
    pub const FAT_FREE_MASS_PCT: &str = "Fat-Free Mass (%)";
    pub const FAT_FREE_MASS_INDEX: &str = "Fat-Free Mass Index (kg/m^2)";
    pub const SKELETAL_MUSCLE_MASS: &str = "Skeletal Muscle Mass (kg)";
    pub const RIGHT_ARM_SMM: &str = "Right Arm SMM (kg)";
    pub const LEFT_ARM_SMM: &str = "Left Arm SMM (kg)";
    pub const RIGHT_LEG_SMM: &str = "Right Leg SMM (kg)";
    pub const LEFT_LEG_SMM: &str = "Left Leg SMM (kg)";
    pub const TORSO_SMM: &str = "Torso SMM (kg)";
    pub const VISCERAL_ADIPOSE_TISSUE: &str = "Visceral Adipose Tissue (L)";
    pub const HEIGHT: &str = "Height (m)";
    pub const WEIGHT: &str = "Weight (kg)";
    pub const BODY_MASS_INDEX: &str = "Body Mass Index (kg/m^2)";
    pub const TOTAL_BODY_WATER_L: &str = "Total Body Water (L)";
    pub const TOTAL_BODY_WATER_PCT: &str = "Total Body Water (%)";
    pub const EXTRACELLULAR_WATER_L: &str = "Extracellular Water (L)";
    pub const EXTRACELLULAR_WATER_PCT: &str = "Extracellular Water (%)";
    pub const ECW_TBW_PCT: &str = "ECW/TBW (%)";
    pub const RESTING_ENERGY_EXPENDITURE: &str = "Resting Energy Expenditure (kcal/day)";
    pub const ENERGY_CONSUMPTION: &str = "Energy Consumption (kcal/day)";
    pub const PHYSICAL_ACTIVITY_LEVEL: &str = "Physical Activity Level";
    pub const PHASE_ANGLE: &str = "Phase Angle (°)";
    pub const PHASE_ANGLE_PERCENTILE: &str = "Phase Angle Percentile";
    pub const RESISTANCE: &str = "Resistance (Ω)";
    pub const REACTANCE: &str = "Reactance (Ω)";
}

use fields::*;

/// Current layout version. Bump when `POSITIONAL_LAYOUT` changes.
pub const SCHEMA_VERSION: u32 = 3;

/// Numerals of the SECA mBCA measurement block, in OCR reading order.
pub const POSITIONAL_LAYOUT: &[&str] = &[
    FAT_MASS_KG,
    FAT_MASS_PCT,
    FAT_MASS_INDEX,
    FAT_FREE_MASS_KG,
    FAT_FREE_MASS_PCT,
    FAT_FREE_MASS_INDEX,
    SKELETAL_MUSCLE_MASS,
    RIGHT_ARM_SMM,
    LEFT_ARM_SMM,
    RIGHT_LEG_SMM,
    LEFT_LEG_SMM,
    TORSO_SMM,
    VISCERAL_ADIPOSE_TISSUE,
    HEIGHT,
    WEIGHT,
    TOTAL_BODY_WATER_L,
    TOTAL_BODY_WATER_PCT,
    EXTRACELLULAR_WATER_L,
    EXTRACELLULAR_WATER_PCT,
    ECW_TBW_PCT,
    RESTING_ENERGY_EXPENDITURE,
    ENERGY_CONSUMPTION,
    PHYSICAL_ACTIVITY_LEVEL,
    PHASE_ANGLE,
    PHASE_ANGLE_PERCENTILE,
    RESISTANCE,
    REACTANCE,
];

/// The canonical schema: positional layout with derived fields spliced in.
pub static CANONICAL_SCHEMA: LazyLock<MeasurementSchema> =
    LazyLock::new(|| MeasurementSchema::splice(SCHEMA_VERSION, POSITIONAL_LAYOUT, DERIVED_FIELDS));

/// The canonical schema as a `'static` reference.
pub fn canonical_schema() -> &'static MeasurementSchema {
    &CANONICAL_SCHEMA
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Read from the report.
    Measured,
    /// Computed from other fields after extraction.
    Derived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementSchema {
    version: u32,
    fields: Vec<FieldSpec>,
}

impl MeasurementSchema {
    /// Build a schema from a layout, inserting every derived field right
    /// after its source. A derived field already present in the layout keeps
    /// its layout position; one whose source is absent goes last.
    pub fn splice(version: u32, layout: &[&'static str], derived: &[DerivedField]) -> Self {
        let mut fields: Vec<FieldSpec> = Vec::with_capacity(layout.len() + derived.len());
        let in_layout = |name: &str| layout.contains(&name);

        for &name in layout {
            let kind = if derived.iter().any(|d| d.name == name) {
                FieldKind::Derived
            } else {
                FieldKind::Measured
            };
            fields.push(FieldSpec { name, kind });

            for d in derived.iter().filter(|d| d.after == name && !in_layout(d.name)) {
                fields.push(FieldSpec {
                    name: d.name,
                    kind: FieldKind::Derived,
                });
            }
        }

        for d in derived
            .iter()
            .filter(|d| !in_layout(d.after) && !in_layout(d.name))
        {
            fields.push(FieldSpec {
                name: d.name,
                kind: FieldKind::Derived,
            });
        }

        Self { version, fields }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Fields read from the report, in schema order.
    pub fn measured_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Measured)
            .map(|f| f.name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// One optional value per schema field.
///
/// Every schema field is always present as a key; an unextracted field is
/// `None`. The value vector can only be created at schema length.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSet {
    schema: &'static MeasurementSchema,
    values: Vec<Option<f64>>,
}

impl MeasurementSet {
    /// All fields `None`.
    pub fn empty(schema: &'static MeasurementSchema) -> Self {
        Self {
            schema,
            values: vec![None; schema.len()],
        }
    }

    pub fn schema(&self) -> &'static MeasurementSchema {
        self.schema
    }

    /// Value of a field, `None` when null or not in the schema.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).and_then(|i| self.values[i])
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.schema.position(name).is_some()
    }

    /// Set a field. Returns `false` (and changes nothing) for unknown fields.
    pub fn set(&mut self, name: &str, value: Option<f64>) -> bool {
        match self.schema.position(name) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    /// (field, value) pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<f64>)> + '_ {
        self.schema.names().zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of non-null fields.
    pub fn populated(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

impl Serialize for MeasurementSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}
