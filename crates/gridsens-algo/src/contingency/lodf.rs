//! Generalized LODF for a simultaneous multi-branch outage.

use crate::error::SensitivityError;
use crate::linalg::{dense_from_rows, direct_inverse_scaled};
use crate::sensitivity::PtdfMatrix;
use crate::sparse::IncidenceBuilder;
use gridsens_core::{Branch, Bus, NameIndex};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// LODF matrix: rows are every branch of the PTDF, columns the outaged
/// branches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LodfMatrix {
    #[serde(rename = "branch_names")]
    branches: NameIndex,
    #[serde(rename = "outage_names")]
    outages: NameIndex,
    /// Row of each outaged branch, in outage order.
    #[serde(skip)]
    outage_rows: Vec<usize>,
    /// `values[branch][outage]`
    values: Vec<Vec<f64>>,
}

impl LodfMatrix {
    /// The 0×0 result of an outage set with no branch in the network.
    pub fn empty() -> Self {
        Self {
            branches: NameIndex::default(),
            outages: NameIndex::default(),
            outage_rows: Vec::new(),
            values: Vec::new(),
        }
    }

    /// LODF for `branch` when `outaged` trips.
    pub fn get(&self, branch: &str, outaged: &str) -> Option<f64> {
        let row = self.branches.get(branch)?;
        let col = self.outages.get(outaged)?;
        Some(self.values[row][col])
    }

    pub fn branch_names(&self) -> &[String] {
        self.branches.names()
    }

    pub fn outage_names(&self) -> &[String] {
        self.outages.names()
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.outages.is_empty()
    }

    pub fn num_branches(&self) -> usize {
        self.branches.len()
    }

    pub fn num_outages(&self) -> usize {
        self.outages.len()
    }

    /// Estimate flows after the outage from pre-outage flows ordered like
    /// [`branch_names`](Self::branch_names).
    ///
    /// `f_post[ℓ] = f_pre[ℓ] + Σₘ LODF[ℓ,m] × f_pre[m]`
    pub fn post_contingency_flows(&self, pre_flows: &[f64]) -> Result<Vec<f64>, SensitivityError> {
        if self.is_empty() {
            return Ok(pre_flows.to_vec());
        }
        if pre_flows.len() != self.num_branches() {
            return Err(SensitivityError::DimensionMismatch(format!(
                "expected {} pre-outage flows, got {}",
                self.num_branches(),
                pre_flows.len()
            )));
        }
        let outaged_flows: Vec<f64> = self.outage_rows.iter().map(|&r| pre_flows[r]).collect();
        Ok(self
            .values
            .iter()
            .zip(pre_flows)
            .map(|(row, &pre)| {
                pre + row
                    .iter()
                    .zip(&outaged_flows)
                    .map(|(lodf, flow)| lodf * flow)
                    .sum::<f64>()
            })
            .collect())
    }
}

/// Compute LODFs for taking every branch named in `outaged` out together.
///
/// Names not found among `branches` are skipped and repeats collapse onto
/// their first occurrence. If nothing remains the empty matrix is returned;
/// a contingency on branches already out of the model is moot, not an error.
///
/// Columns are addressed by name and do not depend on the order of
/// `outaged`. A monitored branch that is itself outaged gets a row of zeros
/// with −1 on its own column, so its post-contingency flow is exactly zero.
pub fn compute_lodf<S: AsRef<str>>(
    buses: &[Bus],
    branches: &[Branch],
    ptdf: &PtdfMatrix,
    outaged: &[S],
) -> Result<LodfMatrix, SensitivityError> {
    let by_name = NameIndex::new(branches.iter().map(|b| b.name.as_str()), "branch")?;

    let mut seen = HashSet::new();
    let mut outage_branches: Vec<&Branch> = Vec::new();
    for name in outaged {
        let name = name.as_ref();
        match by_name.get(name) {
            Some(idx) if seen.insert(idx) => outage_branches.push(&branches[idx]),
            Some(_) => debug!(branch = name, "duplicate outage collapsed"),
            None => debug!(branch = name, "outaged branch not in network, skipped"),
        }
    }
    if outage_branches.is_empty() {
        debug!(
            requested = outaged.len(),
            "no outaged branch present in the network; returning empty LODF"
        );
        return Ok(LodfMatrix::empty());
    }

    let bus_names: Vec<&str> = buses.iter().map(|b| b.name.as_str()).collect();
    if ptdf.bus_names().len() != bus_names.len()
        || ptdf.bus_names().iter().zip(&bus_names).any(|(a, b)| a != b)
    {
        return Err(SensitivityError::BusOrderMismatch);
    }

    let n_out = outage_branches.len();
    debug!(
        branches = ptdf.num_branches(),
        outages = n_out,
        "computing LODF"
    );

    let incidence_out = IncidenceBuilder::from_buses(buses)?.build(outage_branches.iter().copied())?;
    let outage_rows = outage_branches
        .iter()
        .map(|b| {
            ptdf.branch_index()
                .get(&b.name)
                .ok_or_else(|| SensitivityError::MissingPtdfRow(b.name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // ptdf_mo = PTDF · A_outᵀ
    let endpoints: Vec<Vec<(usize, f64)>> = (0..n_out).map(|o| incidence_out.row_entries(o)).collect();
    let ptdf_mo: Vec<Vec<f64>> = ptdf
        .values()
        .iter()
        .map(|row| {
            endpoints
                .iter()
                .map(|entries| entries.iter().map(|&(bus, sign)| row[bus] * sign).sum())
                .collect()
        })
        .collect();

    // (I - ptdf_oo)⁻¹, with ptdf_oo the outaged branches' own rows. Measured
    // against the identity: an outage set that islands a bus leaves
    // I - ptdf_oo singular up to rounding noise.
    let complement: Vec<Vec<f64>> = outage_rows
        .iter()
        .enumerate()
        .map(|(i, &row)| {
            ptdf_mo[row]
                .iter()
                .enumerate()
                .map(|(j, &v)| if i == j { 1.0 - v } else { -v })
                .collect()
        })
        .collect();
    let inverse = direct_inverse_scaled(dense_from_rows(&complement).as_ref(), 1.0)?;

    let mut values: Vec<Vec<f64>> = ptdf_mo
        .iter()
        .map(|row| {
            (0..n_out)
                .map(|j| (0..n_out).map(|k| row[k] * inverse.read(k, j)).sum())
                .collect()
        })
        .collect();

    for (col, (branch, &row)) in outage_branches.iter().zip(&outage_rows).enumerate() {
        if branch.monitored {
            values[row].iter_mut().for_each(|v| *v = 0.0);
            values[row][col] = -1.0;
        }
    }

    Ok(LodfMatrix {
        branches: ptdf.branch_index().clone(),
        outages: NameIndex::new(outage_branches.iter().map(|b| b.name.as_str()), "outage")?,
        outage_rows,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SensitivityConfig;
    use crate::sensitivity::compute_ptdf;
    use crate::linalg::InversionError;
    use crate::test_utils::triangle;
    use gridsens_core::ErrorKind;

    fn triangle_with_ptdf() -> (Vec<Bus>, Vec<Branch>, PtdfMatrix) {
        let (buses, branches) = triangle();
        let ptdf = compute_ptdf(&buses, &branches, &SensitivityConfig::default()).unwrap();
        (buses, branches, ptdf)
    }

    #[test]
    fn test_single_outage_moves_all_flow_to_parallel_path() {
        // Losing A-B leaves B-C-A as the only path between A and B.
        let (buses, branches, ptdf) = triangle_with_ptdf();
        let lodf = compute_lodf(&buses, &branches, &ptdf, &["A-B"]).unwrap();

        assert_eq!(lodf.num_outages(), 1);
        assert_eq!(lodf.num_branches(), 3);
        // Flow on A-B reroutes through C.
        assert!((lodf.get("B-C", "A-B").unwrap() + 1.0).abs() < 1e-10);
        assert!((lodf.get("A-C", "A-B").unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_post_contingency_flow_on_outaged_branch() {
        let (buses, mut branches, _) = triangle_with_ptdf();
        branches[0] = branches[0].clone().monitored();
        let ptdf = compute_ptdf(&buses, &branches, &SensitivityConfig::default()).unwrap();
        let lodf = compute_lodf(&buses, &branches, &ptdf, &["A-B"]).unwrap();

        assert_eq!(lodf.values()[0], vec![-1.0]);
        let pre = ptdf.branch_flows(&[-1.0, 1.0, 0.0]).unwrap();
        let post = lodf.post_contingency_flows(&pre).unwrap();
        assert_eq!(post[0], 0.0);
        // The whole transfer now runs B->C->A.
        assert!((post[1] + 1.0).abs() < 1e-10);
        assert!((post[2] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_unknown_and_duplicate_outages() {
        let (buses, branches, ptdf) = triangle_with_ptdf();
        let lodf = compute_lodf(&buses, &branches, &ptdf, &["X-Y", "B-C", "B-C"]).unwrap();
        assert_eq!(lodf.outage_names(), ["B-C".to_string()]);
    }

    #[test]
    fn test_moot_contingency_is_empty() {
        let (buses, branches, ptdf) = triangle_with_ptdf();
        let lodf = compute_lodf(&buses, &branches, &ptdf, &["X-Y"]).unwrap();
        assert!(lodf.is_empty());
        assert_eq!(lodf.num_branches(), 0);
        assert_eq!(lodf.post_contingency_flows(&[1.0, 2.0]).unwrap(), vec![1.0, 2.0]);

        let none: [&str; 0] = [];
        assert!(compute_lodf(&buses, &branches, &ptdf, &none).unwrap().is_empty());
    }

    #[test]
    fn test_islanding_outage_is_numerical_error() {
        // Without A-B and B-C, bus B hangs on nothing.
        let (buses, branches, ptdf) = triangle_with_ptdf();
        let err = compute_lodf(&buses, &branches, &ptdf, &["A-B", "B-C"]).unwrap_err();
        assert!(matches!(
            err,
            SensitivityError::Inversion(InversionError::Singular { dim: 2 })
        ));
        assert_eq!(err.kind(), ErrorKind::Numerical);
    }

    #[test]
    fn test_bus_order_mismatch() {
        let (mut buses, branches, ptdf) = triangle_with_ptdf();
        buses.reverse();
        let err = compute_lodf(&buses, &branches, &ptdf, &["A-B"]).unwrap_err();
        assert_eq!(err, SensitivityError::BusOrderMismatch);
    }
}
