use crate::classify::Contribution;
use crate::types::{CategoryKey, CategoryValues, Machine, Shape, CATEGORY_COUNT, MACHINE_COUNT, SHAPE_COUNT};

/// Weight sums for every machine × shape × category cell.
///
/// Negative weights (reversal rows) are added like any other and lower the sum.
///
/// All cells exist from construction and start at zero, so every
/// (machine, shape) pair shows up in the report even with no matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationMatrix {
    cells: [[CategoryValues; SHAPE_COUNT]; MACHINE_COUNT],
}

impl Default for AggregationMatrix {
    fn default() -> Self {
        AggregationMatrix {
            cells: [[[0.0; CATEGORY_COUNT]; SHAPE_COUNT]; MACHINE_COUNT],
        }
    }
}

impl AggregationMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_weight(&mut self, machine: Machine, shape: Shape, category: CategoryKey, amount: f64) {
        self.cells[machine.index()][shape.index()][category.index()] += amount;
    }

    pub fn apply(&mut self, c: &Contribution) {
        self.add_weight(c.machine, c.shape, c.category, c.weight);
    }

    pub fn get(&self, machine: Machine, shape: Shape) -> &CategoryValues {
        &self.cells[machine.index()][shape.index()]
    }

    #[cfg(test)]
    pub fn cell(&self, machine: Machine, shape: Shape, category: CategoryKey) -> f64 {
        self.get(machine, shape)[category.index()]
    }

    /// Sum of every cell.
    pub fn total(&self) -> f64 {
        self.cells.iter().flatten().flatten().sum()
    }
}
