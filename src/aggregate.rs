// One aggregation pass over a loaded table: resolve columns, classify every
// row, and accumulate contributions into a fresh matrix.
use crate::classify::{classify_row, RowOutcome};
use crate::columns::ColumnMap;
use crate::error::ColumnError;
use crate::matrix::AggregationMatrix;
use crate::types::{AggregationStats, RawTable};
use tracing::{debug, info, warn};

pub fn aggregate(table: &RawTable) -> Result<(AggregationMatrix, AggregationStats), ColumnError> {
    let columns = ColumnMap::build(&table.headers)?;
    let mut matrix = AggregationMatrix::new();
    let mut stats = AggregationStats::default();

    for record in table.records() {
        stats.total_rows += 1;
        match classify_row(&record, &columns) {
            RowOutcome::Contribution(c) => {
                matrix.apply(&c);
                stats.contributed_rows += 1;
            }
            RowOutcome::Discarded(reason) => {
                debug!(row = record.row_number, %reason, "row discarded");
                *stats.discarded.entry(reason.kind().to_string()).or_default() += 1;
            }
        }
    }
    stats.total_weight = matrix.total();

    info!(
        rows = stats.total_rows,
        contributed = stats.contributed_rows,
        discarded = stats.discarded_rows(),
        "aggregation finished"
    );
    if stats.total_rows > 0 && stats.total_weight == 0.0 {
        warn!(
            headers = %table.visible_headers().join(", "),
            "aggregated weight is zero; check that the column names match the expected headers"
        );
    }

    Ok((matrix, stats))
}
