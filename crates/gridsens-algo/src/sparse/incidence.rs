//! Branch–bus incidence matrix.
//!
//! ```text
//! A[ℓ, to(ℓ)]   = +1
//! A[ℓ, from(ℓ)] = -1
//! ```
//!
//! Every row holds exactly one `+1` and one `-1` and sums to zero. Column
//! order is the bus order handed to [`IncidenceBuilder`]; row order is the
//! branch order handed to [`IncidenceBuilder::build`].

use gridsens_core::{Branch, Bus, GridError, GridResult, NameIndex};
use sprs::{CsMat, CsMatView, TriMat};

/// Entry written at a branch's `to_bus` column.
pub const TO_BUS_SIGN: f64 = 1.0;
/// Entry written at a branch's `from_bus` column.
pub const FROM_BUS_SIGN: f64 = -1.0;

/// Resolves bus names to columns and assembles incidence matrices.
#[derive(Debug, Clone)]
pub struct IncidenceBuilder {
    buses: NameIndex,
}

impl IncidenceBuilder {
    /// Index buses by name. A repeated name is a configuration error.
    pub fn new<I, S>(bus_names: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            buses: NameIndex::new(bus_names, "bus")?,
        })
    }

    pub fn from_buses(buses: &[Bus]) -> GridResult<Self> {
        Self::new(buses.iter().map(|b| b.name.as_str()))
    }

    pub fn bus_index(&self) -> &NameIndex {
        &self.buses
    }

    pub fn n_bus(&self) -> usize {
        self.buses.len()
    }

    /// Build the incidence matrix for `branches`, one row per branch in
    /// iteration order.
    ///
    /// Fails with a data error when a branch names a bus outside the index or
    /// connects a bus to itself.
    pub fn build<'a, I>(&self, branches: I) -> GridResult<IncidenceMatrix>
    where
        I: IntoIterator<Item = &'a Branch>,
    {
        let mut entries = Vec::new();
        let mut branch_names = Vec::new();

        for branch in branches {
            let from = self.column(branch, &branch.from_bus)?;
            let to = self.column(branch, &branch.to_bus)?;
            if from == to {
                return Err(GridError::Data(format!(
                    "branch '{}' has both ends on bus '{}'",
                    branch.name, branch.from_bus
                )));
            }
            entries.push((from, to));
            branch_names.push(branch.name.clone());
        }

        let mut triplets = TriMat::with_capacity((entries.len(), self.n_bus()), 2 * entries.len());
        for (row, &(from, to)) in entries.iter().enumerate() {
            triplets.add_triplet(row, to, TO_BUS_SIGN);
            triplets.add_triplet(row, from, FROM_BUS_SIGN);
        }

        Ok(IncidenceMatrix {
            matrix: triplets.to_csr(),
            branch_names,
        })
    }

    fn column(&self, branch: &Branch, bus: &str) -> GridResult<usize> {
        self.buses.get(bus).ok_or_else(|| {
            GridError::Data(format!(
                "branch '{}' references unknown bus '{}'",
                branch.name, bus
            ))
        })
    }
}

/// Sparse M×N incidence matrix in CSR format.
#[derive(Debug, Clone)]
pub struct IncidenceMatrix {
    matrix: CsMat<f64>,
    branch_names: Vec<String>,
}

impl IncidenceMatrix {
    pub fn view(&self) -> CsMatView<'_, f64> {
        self.matrix.view()
    }

    /// Number of branches.
    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    /// Number of buses.
    pub fn cols(&self) -> usize {
        self.matrix.cols()
    }

    pub fn branch_names(&self) -> &[String] {
        &self.branch_names
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix.get(row, col).copied().unwrap_or(0.0)
    }

    /// Non-zero `(column, value)` pairs of one branch row.
    pub fn row_entries(&self, row: usize) -> Vec<(usize, f64)> {
        self.matrix
            .outer_view(row)
            .map(|r| r.iter().map(|(j, &v)| (j, v)).collect())
            .unwrap_or_default()
    }

    /// Copy with column `col` removed; later columns shift left by one.
    pub fn without_column(&self, col: usize) -> CsMat<f64> {
        let (rows, cols) = self.matrix.shape();
        let mut triplets = TriMat::with_capacity((rows, cols.saturating_sub(1)), self.matrix.nnz());
        for (&val, (i, j)) in self.matrix.iter() {
            match j.cmp(&col) {
                std::cmp::Ordering::Less => triplets.add_triplet(i, j, val),
                std::cmp::Ordering::Greater => triplets.add_triplet(i, j - 1, val),
                std::cmp::Ordering::Equal => {}
            }
        }
        triplets.to_csr()
    }
}
