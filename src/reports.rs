use crate::matrix::AggregationMatrix;
use crate::types::{
    AggregationStats, CategoryKey, CategoryValues, DisplayRow, Machine, ReportRow, ReportSummary,
    Shape, CATEGORY_COUNT,
};
use crate::util::format_weight_cell;
use std::collections::BTreeMap;

pub const PRODUCTION_MARKER: &str = "생산중량";
pub const GRAND_TOTAL_LABEL: &str = "총합계";
/// Machine whose per-row sums are tallied into `Report::diagnostic_total`.
pub const DIAGNOSTIC_MACHINE: Machine = Machine::P15;

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub grand_totals: CategoryValues,
    pub diagnostic_total: f64,
}

impl Report {
    pub fn grand_total_weight(&self) -> f64 {
        self.grand_totals.iter().sum()
    }
}

/// Flatten the matrix into report rows.
///
/// Sections follow `Machine::ALL`, rows within a section follow `Shape::ALL`;
/// each section is followed by a blank separator and the table ends with
/// the grand-total row.
pub fn build_report(matrix: &AggregationMatrix) -> Report {
    let mut rows = Vec::with_capacity(Machine::ALL.len() * (Shape::ALL.len() + 1) + 1);
    let mut grand_totals = [0.0; CATEGORY_COUNT];
    let mut diagnostic_total = 0.0;

    for machine in Machine::ALL {
        for (idx, shape) in Shape::ALL.into_iter().enumerate() {
            let values = *matrix.get(machine, shape);
            for (total, v) in grand_totals.iter_mut().zip(values.iter()) {
                *total += v;
            }
            let row = ReportRow {
                machine: if idx == 0 { machine.label().to_string() } else { String::new() },
                shape: shape.label().to_string(),
                marker: PRODUCTION_MARKER.to_string(),
                values: Some(values),
            };
            if machine == DIAGNOSTIC_MACHINE {
                diagnostic_total += row.row_total();
            }
            rows.push(row);
        }
        rows.push(ReportRow::separator());
    }

    rows.push(ReportRow {
        machine: GRAND_TOTAL_LABEL.to_string(),
        shape: String::new(),
        marker: String::new(),
        values: Some(grand_totals),
    });

    Report { rows, grand_totals, diagnostic_total }
}

/// Presentation pass: thousands separators, blank for zero and for separators.
pub fn render_rows(report: &Report) -> Vec<DisplayRow> {
    report.rows.iter().map(render_row).collect()
}

fn render_row(row: &ReportRow) -> DisplayRow {
    let cell = |key: CategoryKey| {
        row.values
            .map(|v| format_weight_cell(v[key.index()]))
            .unwrap_or_default()
    };
    DisplayRow {
        machine: row.machine.clone(),
        shape: row.shape.clone(),
        marker: row.marker.clone(),
        carbon_ic: cell(CategoryKey::CarbonIc),
        carbon_vsd: cell(CategoryKey::CarbonVsd),
        carbon_cc: cell(CategoryKey::CarbonCc),
        carbon_rb: cell(CategoryKey::CarbonRb),
        carbon_slab: cell(CategoryKey::CarbonSlab),
        alloy_ic: cell(CategoryKey::AlloyIc),
        alloy_vsd: cell(CategoryKey::AlloyVsd),
        alloy_cc: cell(CategoryKey::AlloyCc),
        alloy_rb: cell(CategoryKey::AlloyRb),
        alloy_slab: cell(CategoryKey::AlloySlab),
        sus_ic: cell(CategoryKey::SusIc),
        sus_rb: cell(CategoryKey::SusRb),
        sus_slab: cell(CategoryKey::SusSlab),
        tool_ic: cell(CategoryKey::ToolIc),
        tool_slab: cell(CategoryKey::ToolSlab),
    }
}

pub fn generate_summary(
    report: &Report,
    stats: &AggregationStats,
    source_file: &str,
    sheet: Option<&str>,
    generated_on: &str,
) -> ReportSummary {
    let grand_totals: BTreeMap<String, f64> = CategoryKey::ALL
        .into_iter()
        .map(|k| (k.key().to_string(), report.grand_totals[k.index()]))
        .collect();
    ReportSummary {
        source_file: source_file.to_string(),
        sheet: sheet.map(str::to_string),
        generated_on: generated_on.to_string(),
        stats: stats.clone(),
        grand_totals,
        grand_total_weight: report.grand_total_weight(),
        p15_diagnostic_total: report.diagnostic_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> AggregationMatrix {
        let mut m = AggregationMatrix::new();
        m.add_weight(Machine::P15, Shape::Ring, CategoryKey::CarbonIc, 42565.0);
        m.add_weight(Machine::P15, Shape::Shaft, CategoryKey::CarbonIc, 25625.0);
        m.add_weight(Machine::P15, Shape::Shaft, CategoryKey::CarbonVsd, 39869.0);
        m.add_weight(Machine::P8, Shape::Ring, CategoryKey::CarbonRb, 4084.0);
        m.add_weight(Machine::RM, Shape::Ring, CategoryKey::AlloyRb, 10515.0);
        m.add_weight(Machine::RM, Shape::Disc, CategoryKey::SusRb, 1000.0);
        m.add_weight(Machine::P5, Shape::Rough, CategoryKey::ToolSlab, 3680.0);
        m
    }

    #[test]
    fn test_report_layout() {
        let report = build_report(&AggregationMatrix::new());
        // 4 sections × (6 shapes + separator) + grand total
        assert_eq!(report.rows.len(), 29);

        let first = &report.rows[0];
        assert_eq!(first.machine, "P15");
        assert_eq!(first.shape, "RING");
        assert_eq!(first.marker, PRODUCTION_MARKER);
        assert_eq!(report.rows[1].machine, "");
        assert_eq!(report.rows[5].shape, "황지");
        assert_eq!(report.rows[6], ReportRow::separator());
        assert_eq!(report.rows[7].machine, "P5");
        assert_eq!(report.rows[21].machine, "RM");

        let last = report.rows.last().unwrap();
        assert_eq!(last.machine, GRAND_TOTAL_LABEL);
        assert_eq!(last.shape, "");
        assert_eq!(last.marker, "");
    }

    #[test]
    fn test_grand_totals_equal_cell_sums() {
        let m = populated();
        let report = build_report(&m);

        for key in CategoryKey::ALL {
            let mut expected = 0.0;
            for machine in Machine::ALL {
                for shape in Shape::ALL {
                    expected += m.cell(machine, shape, key);
                }
            }
            assert_eq!(report.grand_totals[key.index()], expected, "{}", key.key());
        }
        assert_eq!(report.rows.last().unwrap().values, Some(report.grand_totals));
        assert_eq!(report.grand_total_weight(), m.total());
    }

    #[test]
    fn test_diagnostic_total_matches_p15_rows() {
        let report = build_report(&populated());
        let p15_rows: f64 = report.rows[..Shape::ALL.len()]
            .iter()
            .map(ReportRow::row_total)
            .sum();
        assert_eq!(report.diagnostic_total, p15_rows);
        assert_eq!(report.diagnostic_total, 42565.0 + 25625.0 + 39869.0);
    }

    #[test]
    fn test_all_zero_matrix_renders_blank_cells() {
        let report = build_report(&AggregationMatrix::new());
        let rendered = render_rows(&report);
        assert_eq!(rendered.len(), 29);

        let shape_rows = rendered.iter().filter(|r| r.marker == PRODUCTION_MARKER).count();
        assert_eq!(shape_rows, 24);
        for r in &rendered {
            assert_eq!(r.carbon_ic, "");
            assert_eq!(r.alloy_vsd, "");
            assert_eq!(r.tool_slab, "");
        }
        assert_eq!(rendered.last().unwrap().machine, GRAND_TOTAL_LABEL);
        assert_eq!(report.diagnostic_total, 0.0);
    }

    #[test]
    fn test_render_formats_weights() {
        let rendered = render_rows(&build_report(&populated()));
        assert_eq!(rendered[0].carbon_ic, "42,565");
        assert_eq!(rendered[1].carbon_vsd, "39,869");
        assert_eq!(rendered[1].carbon_rb, "");
        let total = rendered.last().unwrap();
        assert_eq!(total.carbon_ic, "68,190");
        assert_eq!(total.sus_rb, "1,000");
        assert_eq!(total.tool_slab, "3,680");
    }

    #[test]
    fn test_generate_summary() {
        let report = build_report(&populated());
        let stats = AggregationStats {
            total_rows: 8,
            contributed_rows: 7,
            total_weight: 127338.0,
            ..Default::default()
        };
        let summary = generate_summary(&report, &stats, "raw.xlsx", Some("RAW DATA"), "2025-03-01");
        assert_eq!(summary.grand_totals["carbon_vsd"], 39869.0);
        assert_eq!(summary.grand_totals.len(), CATEGORY_COUNT);
        assert_eq!(summary.grand_total_weight, 127338.0);
        assert_eq!(summary.p15_diagnostic_total, 108059.0);
        assert_eq!(summary.sheet.as_deref(), Some("RAW DATA"));
    }
}
