//! Pre-flight checks over bus and branch records.
//!
//! Mirrors the conditions the sensitivity kernels reject (duplicate names,
//! dangling endpoints, zero impedance) but collects all of them instead of
//! stopping at the first, and adds soft findings the kernels do not check.

use crate::diagnostics::Diagnostics;
use crate::topology::find_islands;
use crate::{Branch, Bus};
use std::collections::HashSet;

/// Sweep `buses` and `branches` and report every issue found.
pub fn validate_network(buses: &[Bus], branches: &[Branch]) -> Diagnostics {
    let mut diag = Diagnostics::new();

    if buses.is_empty() {
        diag.add_error("data", "network has no buses");
        return diag;
    }

    let mut bus_names = HashSet::with_capacity(buses.len());
    for bus in buses {
        if !bus_names.insert(bus.name.as_str()) {
            diag.add_error_with_entity("configuration", "duplicate bus name", &bus.name);
        }
    }

    let mut branch_names = HashSet::with_capacity(branches.len());
    for branch in branches {
        let entity = branch.name.as_str();
        if !branch_names.insert(entity) {
            diag.add_error_with_entity("configuration", "duplicate branch name", entity);
        }

        for endpoint in [&branch.from_bus, &branch.to_bus] {
            if !bus_names.contains(endpoint.as_str()) {
                diag.add_error_with_entity(
                    "data",
                    &format!("references unknown bus '{endpoint}'"),
                    entity,
                );
            }
        }

        if branch.from_bus == branch.to_bus {
            diag.add_error_with_entity("data", "both ends on the same bus", entity);
        }

        match branch.transformer_setting() {
            None if is_zero(branch.reactance) => {
                diag.add_error_with_entity("numerical", "line has zero reactance", entity);
            }
            Some((tap, _)) if is_zero(tap) => {
                diag.add_error_with_entity("numerical", "transformer has zero tap ratio", entity);
            }
            Some(_) if is_zero(branch.resistance) && is_zero(branch.reactance) => {
                diag.add_error_with_entity("numerical", "transformer has zero impedance", entity);
            }
            _ => {}
        }
    }

    if branches.is_empty() {
        diag.add_warning("data", "network has no branches");
    } else if !branches.iter().any(|b| b.monitored) {
        diag.add_warning("data", "no branch is monitored");
    }

    let islands = find_islands(buses, branches);
    if !islands.is_connected() {
        diag.add_warning(
            "topology",
            &format!("network splits into {} islands", islands.count()),
        );
    }

    diag
}

/// Exact zero test; the kernels divide by these values.
#[inline]
fn is_zero(value: f64) -> bool {
    value == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Kilovolts, Severity};

    fn three_buses() -> Vec<Bus> {
        ["A", "B", "C"]
            .iter()
            .map(|n| Bus::new(*n, Kilovolts(230.0)))
            .collect()
    }

    #[test]
    fn test_clean_network_has_no_issues() {
        let branches = vec![
            Branch::new("AB", "A", "B", 0.01, 0.1).monitored(),
            Branch::new("BC", "B", "C", 0.01, 0.1),
        ];
        let diag = validate_network(&three_buses(), &branches);
        assert!(diag.is_clean(), "{:?}", diag.issues);
    }

    #[test]
    fn test_collects_every_error() {
        let mut buses = three_buses();
        buses.push(Bus::new("A", Kilovolts(230.0)));
        let branches = vec![
            Branch::new("AB", "A", "B", 0.01, 0.0).monitored(),
            Branch::new("AB", "A", "Z", 0.01, 0.1),
            Branch::new("CC", "C", "C", 0.01, 0.1),
            Branch::new("T1", "B", "C", 0.0, 0.0).with_tap(1.0),
        ];
        let diag = validate_network(&buses, &branches);

        assert_eq!(diag.issues_by_category("configuration").count(), 2);
        assert_eq!(diag.issues_by_category("data").count(), 2);
        assert_eq!(diag.issues_by_category("numerical").count(), 2);
        assert!(diag
            .errors()
            .any(|i| i.entity.as_deref() == Some("T1") && i.message.contains("zero impedance")));
    }

    #[test]
    fn test_islands_and_unmonitored_are_warnings() {
        let branches = vec![Branch::new("AB", "A", "B", 0.01, 0.1)];
        let diag = validate_network(&three_buses(), &branches);
        assert!(!diag.has_errors());
        assert_eq!(diag.warning_count(), 2);
        assert!(diag
            .issues
            .iter()
            .all(|issue| issue.severity == Severity::Warning));
    }
}
