// Header resolution: map the six logical fields onto whatever the sheet
// actually calls them. Pivot exports prefix aggregated columns with
// `합계 : `, and hand-edited sheets tend to carry stray whitespace.
use crate::error::ColumnError;
use crate::types::{LogicalField, RawRecord};
use tracing::debug;

/// Prefix added by spreadsheet pivot tables to summed columns ("Sum : ").
pub const PIVOT_PREFIX: &str = "합계 : ";

/// Find the header that stands for `logical_name`.
///
/// An exact match (after trimming) always wins; otherwise the first
/// pivot-prefixed header whose remainder mentions the name is taken.
/// Returns the header's position in `headers`.
pub fn resolve<S: AsRef<str>>(headers: &[S], logical_name: &str) -> Option<usize> {
    let target = logical_name.trim();
    if let Some(i) = headers.iter().position(|h| h.as_ref().trim() == target) {
        return Some(i);
    }
    headers.iter().position(|h| {
        h.as_ref()
            .trim()
            .strip_prefix(PIVOT_PREFIX)
            .is_some_and(|rest| rest.contains(target))
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub header: String,
}

/// Resolved positions of every required field, in `LogicalField::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    columns: Vec<ResolvedColumn>,
}

impl ColumnMap {
    /// Resolve all required fields, failing with every missing one at once.
    pub fn build<S: AsRef<str>>(headers: &[S]) -> Result<Self, ColumnError> {
        let mut columns = Vec::with_capacity(LogicalField::ALL.len());
        let mut missing = Vec::new();

        for field in LogicalField::ALL {
            match resolve(headers, field.header_name()) {
                Some(index) => {
                    let header = headers[index].as_ref().to_string();
                    debug!(field = field.header_name(), header = %header, index, "column resolved");
                    columns.push(ResolvedColumn { index, header });
                }
                None => missing.push(field.header_name().to_string()),
            }
        }

        if !missing.is_empty() {
            let found = headers
                .iter()
                .map(|h| h.as_ref().trim())
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect();
            return Err(ColumnError::Missing { missing, found });
        }

        Ok(ColumnMap { columns })
    }

    pub fn column(&self, field: LogicalField) -> &ResolvedColumn {
        &self.columns[field.index()]
    }

    pub fn value<'a>(&self, record: &RawRecord<'a>, field: LogicalField) -> &'a str {
        record.get(self.column(field).index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    const FULL: [&str; 6] = [
        "생산중량(양품)",
        "프레스별",
        "제품형상",
        "강종",
        "소재타입",
        "INGOT 종류",
    ];

    #[test]
    fn test_resolve_exact_after_trim() {
        let h = headers(&["작업장", "  프레스별 ", "제품형상"]);
        assert_eq!(resolve(&h, "프레스별"), Some(1));
        assert_eq!(resolve(&h, " 제품형상 "), Some(2));
    }

    #[test]
    fn test_resolve_pivot_prefix() {
        let h = headers(&["행 레이블", "합계 : 생산중량(양품)"]);
        assert_eq!(resolve(&h, "생산중량(양품)"), Some(1));
    }

    #[test]
    fn test_resolve_prefers_exact_over_pivot() {
        let h = headers(&["합계 : 생산중량(양품)", "생산중량(양품)"]);
        assert_eq!(resolve(&h, "생산중량(양품)"), Some(1));
    }

    #[test]
    fn test_resolve_requires_prefix_for_substring_match() {
        let h = headers(&["생산중량(양품) 누계"]);
        assert_eq!(resolve(&h, "생산중량(양품)"), None);
    }

    #[test]
    fn test_build_reports_all_missing_fields() {
        let h = headers(&["생산중량(양품)", "프레스별", "", "비고"]);
        let err = ColumnMap::build(&h).unwrap_err();
        let ColumnError::Missing { missing, found } = err;
        assert_eq!(missing, vec!["제품형상", "강종", "소재타입", "INGOT 종류"]);
        assert_eq!(found, vec!["생산중량(양품)", "프레스별", "비고"]);
    }

    #[test]
    fn test_build_is_order_independent() {
        let forward = headers(&FULL);
        let mut shuffled = forward.clone();
        shuffled.reverse();
        shuffled.insert(2, "품명".to_string());

        let a = ColumnMap::build(&forward).unwrap();
        let b = ColumnMap::build(&shuffled).unwrap();
        for field in LogicalField::ALL {
            assert_eq!(a.column(field).header, b.column(field).header);
            assert_eq!(shuffled[b.column(field).index], b.column(field).header);
        }
    }

    #[test]
    fn test_value_reads_missing_cells_as_blank() {
        let map = ColumnMap::build(&headers(&FULL)).unwrap();
        let cells = headers(&["1,000", "P15"]);
        let record = RawRecord { row_number: 2, cells: &cells };
        assert_eq!(map.value(&record, LogicalField::Weight), "1,000");
        assert_eq!(map.value(&record, LogicalField::IngotType), "");
    }
}
