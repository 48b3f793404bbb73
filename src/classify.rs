// Row classification: turn one loosely-typed production record into a
// (machine, shape, category, weight) contribution, or say why it was dropped.
use crate::columns::ColumnMap;
use crate::types::{CategoryKey, LogicalField, Machine, MaterialClass, RawRecord, Shape, SourceSuffix};
use crate::util::{contains_any, parse_weight};
use std::fmt;

/// Shape-column markers of pivot summary rows, matched against lower-cased text.
pub const SUMMARY_KEYWORDS: &[&str] = &[
    "총합계",
    "합계",
    "소계",
    "레이블",
    "grand total",
    "subtotal",
    "total",
    "label",
];

/// Equipment codes that are reported under another bucket.
const MACHINE_ALIASES: &[(&str, Machine)] = &[("R9", Machine::RM), ("R9500", Machine::RM)];

/// Steel-grade tokens, checked in this order; first hit wins.
const MATERIAL_TOKENS: &[(MaterialClass, &[&str])] = &[
    (MaterialClass::Carbon, &["CARBON", "S355"]),
    (MaterialClass::Alloy, &["ALLOY", "AISI"]),
    (MaterialClass::Sus, &["SUS", "STAINLESS"]),
    (MaterialClass::Tool, &["TOOL", "SKD"]),
];

const INGOT_TOKENS: &[&str] = &["INGOT"];
const BLOOM_TOKENS: &[&str] = &["R/B", "BLOOM"];
const SLAB_TOKENS: &[&str] = &["SLAB"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub machine: Machine,
    pub shape: Shape,
    pub category: CategoryKey,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiscardReason {
    InvalidWeight(String),
    ZeroWeight,
    SummaryRow(String),
    UnknownMachine(String),
    UnknownShape(String),
    UnknownMaterial(String),
    UnmappedCategory(MaterialClass, SourceSuffix),
}

impl DiscardReason {
    /// Stable tag used for discard statistics.
    pub fn kind(&self) -> &'static str {
        match self {
            DiscardReason::InvalidWeight(_) => "invalid_weight",
            DiscardReason::ZeroWeight => "zero_weight",
            DiscardReason::SummaryRow(_) => "summary_row",
            DiscardReason::UnknownMachine(_) => "unknown_machine",
            DiscardReason::UnknownShape(_) => "unknown_shape",
            DiscardReason::UnknownMaterial(_) => "unknown_material",
            DiscardReason::UnmappedCategory(..) => "unmapped_category",
        }
    }
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::InvalidWeight(v) => write!(f, "weight {v:?} is not a number"),
            DiscardReason::ZeroWeight => write!(f, "weight is zero"),
            DiscardReason::SummaryRow(v) => write!(f, "pivot summary row ({v:?})"),
            DiscardReason::UnknownMachine(v) => write!(f, "machine {v:?} is not reported"),
            DiscardReason::UnknownShape(v) => write!(f, "shape {v:?} is not reported"),
            DiscardReason::UnknownMaterial(v) => write!(f, "steel grade {v:?} is unclassified"),
            DiscardReason::UnmappedCategory(m, s) => {
                write!(f, "no report column for {}_{}", m.name(), s.name())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Contribution(Contribution),
    Discarded(DiscardReason),
}

pub fn is_summary_row(shape_raw: &str) -> bool {
    contains_any(&shape_raw.to_lowercase(), SUMMARY_KEYWORDS)
}

pub fn normalize_machine(raw: &str) -> Option<Machine> {
    let code = raw.trim().to_uppercase();
    MACHINE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == code)
        .map(|(_, machine)| *machine)
        .or_else(|| Machine::from_label(&code))
}

pub fn normalize_shape(raw: &str) -> Option<Shape> {
    Shape::from_label(&raw.trim().to_uppercase())
}

pub fn classify_material(raw: &str) -> Option<MaterialClass> {
    let grade = raw.to_uppercase();
    MATERIAL_TOKENS
        .iter()
        .find(|(_, tokens)| contains_any(&grade, tokens))
        .map(|(class, _)| *class)
}

/// Feedstock suffix from the source-type and ingot-type cells; defaults to IC.
pub fn classify_source(source_type: &str, ingot_type: &str) -> SourceSuffix {
    let source = source_type.to_uppercase();
    if contains_any(&source, INGOT_TOKENS) {
        let ingot = ingot_type.to_uppercase();
        if ingot.contains("VSD") {
            SourceSuffix::Vsd
        } else if ingot.contains("CC") {
            SourceSuffix::Cc
        } else {
            SourceSuffix::Ic
        }
    } else if contains_any(&source, BLOOM_TOKENS) {
        SourceSuffix::Rb
    } else if contains_any(&source, SLAB_TOKENS) {
        SourceSuffix::Slab
    } else {
        SourceSuffix::Ic
    }
}

pub fn classify_row(record: &RawRecord<'_>, columns: &ColumnMap) -> RowOutcome {
    match classify_inner(record, columns) {
        Ok(c) => RowOutcome::Contribution(c),
        Err(reason) => RowOutcome::Discarded(reason),
    }
}

fn classify_inner(record: &RawRecord<'_>, columns: &ColumnMap) -> Result<Contribution, DiscardReason> {
    let weight_raw = columns.value(record, LogicalField::Weight);
    let weight = parse_weight(weight_raw)
        .ok_or_else(|| DiscardReason::InvalidWeight(weight_raw.to_string()))?;
    if weight == 0.0 {
        return Err(DiscardReason::ZeroWeight);
    }

    let shape_raw = columns.value(record, LogicalField::Shape);
    if is_summary_row(shape_raw) {
        return Err(DiscardReason::SummaryRow(shape_raw.to_string()));
    }

    let machine_raw = columns.value(record, LogicalField::Machine);
    let machine = normalize_machine(machine_raw)
        .ok_or_else(|| DiscardReason::UnknownMachine(machine_raw.to_string()))?;

    let shape =
        normalize_shape(shape_raw).ok_or_else(|| DiscardReason::UnknownShape(shape_raw.to_string()))?;

    let material_raw = columns.value(record, LogicalField::Material);
    let material = classify_material(material_raw)
        .ok_or_else(|| DiscardReason::UnknownMaterial(material_raw.to_string()))?;

    let source = classify_source(
        columns.value(record, LogicalField::SourceType),
        columns.value(record, LogicalField::IngotType),
    );

    let category = CategoryKey::compose(material, source)
        .ok_or(DiscardReason::UnmappedCategory(material, source))?;

    Ok(Contribution { machine, shape, category, weight })
}
