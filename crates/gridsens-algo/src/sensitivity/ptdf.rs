//! PTDF computation from the reduced bus admittance matrix.
//!
//! With incidence `A` (reference column removed) and branch susceptances `b`:
//!
//! ```text
//! B_w  = diag(b) · A_r          (M × N−1, sparse)
//! M    = A_rᵀ · B_w             (N−1 × N−1, sparse, densified to invert)
//! PTDF = B_w · M⁻¹              (M × N−1, then a zero reference column)
//! ```

use crate::config::SensitivityConfig;
use crate::error::SensitivityError;
use crate::linalg::{dense_from_rows, dense_from_sparse, BlockInverter};
use crate::sparse::{susceptance_vector, IncidenceBuilder};
use faer::Mat;
use gridsens_core::{find_islands, Branch, Bus, NameIndex};
use serde::Serialize;
use sprs::{CsMat, TriMat};
use tracing::debug;

/// PTDF matrix: sensitivity of branch flows to bus injections.
///
/// Rows follow the branch order and columns the bus order given to
/// [`compute_ptdf`]. The reference-bus column is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PtdfMatrix {
    #[serde(rename = "branch_names")]
    branches: NameIndex,
    #[serde(rename = "bus_names")]
    buses: NameIndex,
    reference_bus: usize,
    /// `values[branch][bus]`
    values: Vec<Vec<f64>>,
}

impl PtdfMatrix {
    /// PTDF for `branch` with respect to an injection at `bus`.
    pub fn get(&self, branch: &str, bus: &str) -> Option<f64> {
        let row = self.branches.get(branch)?;
        let col = self.buses.get(bus)?;
        Some(self.values[row][col])
    }

    pub fn get_by_idx(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied()
    }

    /// Sensitivities of one branch to every bus, in bus order.
    pub fn row(&self, branch: &str) -> Option<&[f64]> {
        let row = self.branches.get(branch)?;
        Some(&self.values[row])
    }

    pub fn branch_names(&self) -> &[String] {
        self.branches.names()
    }

    pub fn bus_names(&self) -> &[String] {
        self.buses.names()
    }

    pub fn branch_index(&self) -> &NameIndex {
        &self.branches
    }

    pub fn bus_index(&self) -> &NameIndex {
        &self.buses
    }

    /// Number of branches (rows).
    pub fn num_branches(&self) -> usize {
        self.branches.len()
    }

    /// Number of buses (columns).
    pub fn num_buses(&self) -> usize {
        self.buses.len()
    }

    /// Name of the reference bus.
    pub fn reference_bus(&self) -> &str {
        &self.buses.names()[self.reference_bus]
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn to_dense(&self) -> Mat<f64> {
        if self.values.is_empty() {
            return Mat::zeros(0, self.num_buses());
        }
        dense_from_rows(&self.values)
    }

    /// DC branch flows for a vector of net bus injections ordered like
    /// [`bus_names`](Self::bus_names). The reference bus absorbs the balance.
    pub fn branch_flows(&self, injections: &[f64]) -> Result<Vec<f64>, SensitivityError> {
        if injections.len() != self.num_buses() {
            return Err(SensitivityError::DimensionMismatch(format!(
                "expected {} bus injections, got {}",
                self.num_buses(),
                injections.len()
            )));
        }
        Ok(self
            .values
            .iter()
            .map(|row| row.iter().zip(injections).map(|(f, p)| f * p).sum())
            .collect())
    }

    /// Flow change on `branch` per unit transferred from `from_bus` to
    /// `to_bus`.
    pub fn transfer_factor(&self, branch: &str, from_bus: &str, to_bus: &str) -> Option<f64> {
        Some(self.get(branch, from_bus)? - self.get(branch, to_bus)?)
    }
}

/// Compute the PTDF matrix of a network.
///
/// The reference bus is `config.reference_bus`, or the first bus when unset.
/// The reduced admittance matrix is inverted with a [`BlockInverter`] of
/// `config.block_size`.
pub fn compute_ptdf(
    buses: &[Bus],
    branches: &[Branch],
    config: &SensitivityConfig,
) -> Result<PtdfMatrix, SensitivityError> {
    config.validate()?;
    if buses.len() < 2 {
        return Err(SensitivityError::TooFewBuses(buses.len()));
    }
    debug!(
        buses = buses.len(),
        branches = branches.len(),
        block_size = config.block_size,
        "computing PTDF"
    );

    let builder = IncidenceBuilder::from_buses(buses)?;
    let incidence = builder.build(branches)?;
    let branch_index = NameIndex::new(branches.iter().map(|b| b.name.as_str()), "branch")?;
    let susceptance = susceptance_vector(branches)?;

    let reference = match config.reference_bus.as_deref() {
        Some(name) => builder
            .bus_index()
            .get(name)
            .ok_or_else(|| SensitivityError::ReferenceBusNotFound(name.to_string()))?,
        None => 0,
    };

    let islands = find_islands(buses, branches);
    if !islands.is_connected() {
        return Err(SensitivityError::Disconnected {
            islands: islands.count(),
        });
    }

    let reduced = incidence.without_column(reference);
    let weighted = scale_rows(&reduced, &susceptance);
    let admittance: CsMat<f64> = &reduced.transpose_view().to_csr() * &weighted;
    debug!(
        dim = admittance.rows(),
        nnz = admittance.nnz(),
        reference = %builder.bus_index().names()[reference],
        "reduced admittance matrix assembled"
    );

    let dense = dense_from_sparse(&admittance);
    let inverse = BlockInverter::new(config.block_size)?.invert(dense.as_ref())?;

    let n_bus = builder.n_bus();
    let mut values = Vec::with_capacity(weighted.rows());
    for row in weighted.outer_iterator() {
        let mut ptdf_row = vec![0.0; n_bus];
        for (k, &w) in row.iter() {
            for (j, entry) in ptdf_row.iter_mut().enumerate() {
                if j == reference {
                    continue;
                }
                let col = if j < reference { j } else { j - 1 };
                *entry += w * inverse.read(k, col);
            }
        }
        values.push(ptdf_row);
    }

    Ok(PtdfMatrix {
        branches: branch_index,
        buses: builder.bus_index().clone(),
        reference_bus: reference,
        values,
    })
}

/// `diag(weights) · matrix`
fn scale_rows(matrix: &CsMat<f64>, weights: &[f64]) -> CsMat<f64> {
    let mut triplets = TriMat::with_capacity(matrix.shape(), matrix.nnz());
    for (&val, (i, j)) in matrix.iter() {
        triplets.add_triplet(i, j, val * weights[i]);
    }
    triplets.to_csr()
}
