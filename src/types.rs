use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

pub const MACHINE_COUNT: usize = 4;
pub const SHAPE_COUNT: usize = 6;
pub const CATEGORY_COUNT: usize = 15;

/// Running weight sums for one (machine, shape) pair, in `CategoryKey::ALL` order.
pub type CategoryValues = [f64; CATEGORY_COUNT];

/// Forging equipment buckets, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Machine {
    P15,
    P5,
    P8,
    RM,
}

impl Machine {
    pub const ALL: [Machine; MACHINE_COUNT] = [Machine::P15, Machine::P5, Machine::P8, Machine::RM];

    pub fn label(self) -> &'static str {
        match self {
            Machine::P15 => "P15",
            Machine::P5 => "P5",
            Machine::P8 => "P8",
            Machine::RM => "RM",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == s)
    }
}

/// Product shapes, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shape {
    Ring,
    Shaft,
    Disc,
    Shell,
    Square,
    /// Rough forging (황지).
    Rough,
}

impl Shape {
    pub const ALL: [Shape; SHAPE_COUNT] = [
        Shape::Ring,
        Shape::Shaft,
        Shape::Disc,
        Shape::Shell,
        Shape::Square,
        Shape::Rough,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Shape::Ring => "RING",
            Shape::Shaft => "SHAFT",
            Shape::Disc => "DISC",
            Shape::Shell => "SHELL",
            Shape::Square => "SQUARE",
            Shape::Rough => "황지",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sh| sh.label() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialClass {
    Carbon,
    Alloy,
    Sus,
    Tool,
}

impl MaterialClass {
    pub fn name(self) -> &'static str {
        match self {
            MaterialClass::Carbon => "carbon",
            MaterialClass::Alloy => "alloy",
            MaterialClass::Sus => "sus",
            MaterialClass::Tool => "tool",
        }
    }
}

/// Feedstock source of a forging: ingot sub-methods, bloom or slab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceSuffix {
    Ic,
    Vsd,
    Cc,
    Rb,
    Slab,
}

impl SourceSuffix {
    pub fn name(self) -> &'static str {
        match self {
            SourceSuffix::Ic => "ic",
            SourceSuffix::Vsd => "vsd",
            SourceSuffix::Cc => "cc",
            SourceSuffix::Rb => "rb",
            SourceSuffix::Slab => "slab",
        }
    }
}

/// The 15 (material, source) pairings that appear as report columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryKey {
    CarbonIc,
    CarbonVsd,
    CarbonCc,
    CarbonRb,
    CarbonSlab,
    AlloyIc,
    AlloyVsd,
    AlloyCc,
    AlloyRb,
    AlloySlab,
    SusIc,
    SusRb,
    SusSlab,
    ToolIc,
    ToolSlab,
}

impl CategoryKey {
    pub const ALL: [CategoryKey; CATEGORY_COUNT] = [
        CategoryKey::CarbonIc,
        CategoryKey::CarbonVsd,
        CategoryKey::CarbonCc,
        CategoryKey::CarbonRb,
        CategoryKey::CarbonSlab,
        CategoryKey::AlloyIc,
        CategoryKey::AlloyVsd,
        CategoryKey::AlloyCc,
        CategoryKey::AlloyRb,
        CategoryKey::AlloySlab,
        CategoryKey::SusIc,
        CategoryKey::SusRb,
        CategoryKey::SusSlab,
        CategoryKey::ToolIc,
        CategoryKey::ToolSlab,
    ];

    /// Returns `None` for pairings the report has no column for (e.g. SUS/VSD).
    pub fn compose(material: MaterialClass, source: SourceSuffix) -> Option<Self> {
        use CategoryKey::*;
        use MaterialClass as M;
        use SourceSuffix as S;
        let key = match (material, source) {
            (M::Carbon, S::Ic) => CarbonIc,
            (M::Carbon, S::Vsd) => CarbonVsd,
            (M::Carbon, S::Cc) => CarbonCc,
            (M::Carbon, S::Rb) => CarbonRb,
            (M::Carbon, S::Slab) => CarbonSlab,
            (M::Alloy, S::Ic) => AlloyIc,
            (M::Alloy, S::Vsd) => AlloyVsd,
            (M::Alloy, S::Cc) => AlloyCc,
            (M::Alloy, S::Rb) => AlloyRb,
            (M::Alloy, S::Slab) => AlloySlab,
            (M::Sus, S::Ic) => SusIc,
            (M::Sus, S::Rb) => SusRb,
            (M::Sus, S::Slab) => SusSlab,
            (M::Tool, S::Ic) => ToolIc,
            (M::Tool, S::Slab) => ToolSlab,
            _ => return None,
        };
        Some(key)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            CategoryKey::CarbonIc => "carbon_ic",
            CategoryKey::CarbonVsd => "carbon_vsd",
            CategoryKey::CarbonCc => "carbon_cc",
            CategoryKey::CarbonRb => "carbon_rb",
            CategoryKey::CarbonSlab => "carbon_slab",
            CategoryKey::AlloyIc => "alloy_ic",
            CategoryKey::AlloyVsd => "alloy_vsd",
            CategoryKey::AlloyCc => "alloy_cc",
            CategoryKey::AlloyRb => "alloy_rb",
            CategoryKey::AlloySlab => "alloy_slab",
            CategoryKey::SusIc => "sus_ic",
            CategoryKey::SusRb => "sus_rb",
            CategoryKey::SusSlab => "sus_slab",
            CategoryKey::ToolIc => "tool_ic",
            CategoryKey::ToolSlab => "tool_slab",
        }
    }

    /// Report column header; `DisplayRow::column_headers` is built from these.
    pub fn column_label(self) -> &'static str {
        match self {
            CategoryKey::CarbonIc => "탄소강(IC)",
            CategoryKey::CarbonVsd => "탄소강(VSD)",
            CategoryKey::CarbonCc => "탄소강(CC)",
            CategoryKey::CarbonRb => "탄소강(R/B)",
            CategoryKey::CarbonSlab => "탄소강(Slab)",
            CategoryKey::AlloyIc => "합금강(IC)",
            CategoryKey::AlloyVsd => "합금강(VSD)",
            CategoryKey::AlloyCc => "합금강(CC)",
            CategoryKey::AlloyRb => "합금강(R/B)",
            CategoryKey::AlloySlab => "합금강(Slab)",
            CategoryKey::SusIc => "SUS(IC)",
            CategoryKey::SusRb => "SUS(R/B)",
            CategoryKey::SusSlab => "SUS(Slab)",
            CategoryKey::ToolIc => "공구강(IC)",
            CategoryKey::ToolSlab => "공구강(Slab)",
        }
    }
}

/// The six columns every production sheet must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    Weight,
    Machine,
    Shape,
    Material,
    SourceType,
    IngotType,
}

impl LogicalField {
    pub const ALL: [LogicalField; 6] = [
        LogicalField::Weight,
        LogicalField::Machine,
        LogicalField::Shape,
        LogicalField::Material,
        LogicalField::SourceType,
        LogicalField::IngotType,
    ];

    /// Header text as it appears in the RAW DATA sheet.
    pub fn header_name(self) -> &'static str {
        match self {
            LogicalField::Weight => "생산중량(양품)",
            LogicalField::Machine => "프레스별",
            LogicalField::Shape => "제품형상",
            LogicalField::Material => "강종",
            LogicalField::SourceType => "소재타입",
            LogicalField::IngotType => "INGOT 종류",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A loaded sheet: header row plus data rows of raw cell text.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn records(&self) -> impl Iterator<Item = RawRecord<'_>> {
        self.rows.iter().enumerate().map(|(i, cells)| RawRecord {
            // +2: one for the header row, one for 1-based numbering
            row_number: i + 2,
            cells,
        })
    }

    /// Trimmed, non-blank headers, used in diagnostics.
    pub fn visible_headers(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    pub row_number: usize,
    pub cells: &'a [String],
}

impl<'a> RawRecord<'a> {
    /// Missing trailing cells read as blank.
    pub fn get(&self, index: usize) -> &'a str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// One line of the flattened report before presentation formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub machine: String,
    pub shape: String,
    pub marker: String,
    /// `None` for separator rows.
    pub values: Option<CategoryValues>,
}

impl ReportRow {
    pub fn separator() -> Self {
        ReportRow {
            machine: String::new(),
            shape: String::new(),
            marker: String::new(),
            values: None,
        }
    }

    pub fn row_total(&self) -> f64 {
        self.values.map(|v| v.iter().sum()).unwrap_or(0.0)
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct DisplayRow {
    #[serde(rename = "설비")]
    #[tabled(rename = "설비")]
    pub machine: String,
    #[serde(rename = "제품형상")]
    #[tabled(rename = "제품형상")]
    pub shape: String,
    #[serde(rename = "구분")]
    #[tabled(rename = "구분")]
    pub marker: String,
    #[serde(rename = "탄소강(IC)")]
    #[tabled(rename = "탄소강(IC)")]
    pub carbon_ic: String,
    #[serde(rename = "탄소강(VSD)")]
    #[tabled(rename = "탄소강(VSD)")]
    pub carbon_vsd: String,
    #[serde(rename = "탄소강(CC)")]
    #[tabled(rename = "탄소강(CC)")]
    pub carbon_cc: String,
    #[serde(rename = "탄소강(R/B)")]
    #[tabled(rename = "탄소강(R/B)")]
    pub carbon_rb: String,
    #[serde(rename = "탄소강(Slab)")]
    #[tabled(rename = "탄소강(Slab)")]
    pub carbon_slab: String,
    #[serde(rename = "합금강(IC)")]
    #[tabled(rename = "합금강(IC)")]
    pub alloy_ic: String,
    #[serde(rename = "합금강(VSD)")]
    #[tabled(rename = "합금강(VSD)")]
    pub alloy_vsd: String,
    #[serde(rename = "합금강(CC)")]
    #[tabled(rename = "합금강(CC)")]
    pub alloy_cc: String,
    #[serde(rename = "합금강(R/B)")]
    #[tabled(rename = "합금강(R/B)")]
    pub alloy_rb: String,
    #[serde(rename = "합금강(Slab)")]
    #[tabled(rename = "합금강(Slab)")]
    pub alloy_slab: String,
    #[serde(rename = "SUS(IC)")]
    #[tabled(rename = "SUS(IC)")]
    pub sus_ic: String,
    #[serde(rename = "SUS(R/B)")]
    #[tabled(rename = "SUS(R/B)")]
    pub sus_rb: String,
    #[serde(rename = "SUS(Slab)")]
    #[tabled(rename = "SUS(Slab)")]
    pub sus_slab: String,
    #[serde(rename = "공구강(IC)")]
    #[tabled(rename = "공구강(IC)")]
    pub tool_ic: String,
    #[serde(rename = "공구강(Slab)")]
    #[tabled(rename = "공구강(Slab)")]
    pub tool_slab: String,
}

/// Label columns in front of the category columns.
pub const LABEL_HEADERS: [&str; LABEL_COUNT] = ["설비", "제품형상", "구분"];
const LABEL_COUNT: usize = 3;

impl DisplayRow {
    pub fn column_headers() -> Vec<&'static str> {
        LABEL_HEADERS
            .iter()
            .copied()
            .chain(CategoryKey::ALL.iter().map(|k| k.column_label()))
            .collect()
    }

    /// Cell text in `column_headers` order.
    pub fn cells(&self) -> [&str; LABEL_COUNT + CATEGORY_COUNT] {
        [
            self.machine.as_str(),
            self.shape.as_str(),
            self.marker.as_str(),
            self.carbon_ic.as_str(),
            self.carbon_vsd.as_str(),
            self.carbon_cc.as_str(),
            self.carbon_rb.as_str(),
            self.carbon_slab.as_str(),
            self.alloy_ic.as_str(),
            self.alloy_vsd.as_str(),
            self.alloy_cc.as_str(),
            self.alloy_rb.as_str(),
            self.alloy_slab.as_str(),
            self.sus_ic.as_str(),
            self.sus_rb.as_str(),
            self.sus_slab.as_str(),
            self.tool_ic.as_str(),
            self.tool_slab.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationStats {
    pub total_rows: usize,
    pub contributed_rows: usize,
    /// Discard counts keyed by `DiscardReason::kind`.
    pub discarded: BTreeMap<String, usize>,
    pub total_weight: f64,
}

impl AggregationStats {
    pub fn discarded_rows(&self) -> usize {
        self.discarded.values().sum()
    }
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub source_file: String,
    pub sheet: Option<String>,
    pub generated_on: String,
    pub stats: AggregationStats,
    pub grand_totals: BTreeMap<String, f64>,
    pub grand_total_weight: f64,
    pub p15_diagnostic_total: f64,
}
