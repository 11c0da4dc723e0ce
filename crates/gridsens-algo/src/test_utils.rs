//! Small reference networks shared by unit and integration tests.

use gridsens_core::{Branch, Bus, Kilovolts};

/// IEEE 14-bus case buses, `"Bus 1"` through `"Bus 14"`.
pub fn ieee14_buses() -> Vec<Bus> {
    (1..=14)
        .map(|i| {
            let kv = match i {
                1..=5 => 132.0,
                8 => 18.0,
                _ => 33.0,
            };
            Bus::new(format!("Bus {i}"), Kilovolts(kv))
        })
        .collect()
}

/// IEEE 14-bus case branches, named `"<from>-<to>"`.
///
/// Transformer taps are left off so the branches are plain lines with the
/// case's series impedances; none are monitored.
pub fn ieee14_branches() -> Vec<Branch> {
    const DATA: [(u32, u32, f64, f64); 20] = [
        (1, 2, 0.01938, 0.05917),
        (1, 5, 0.05403, 0.22304),
        (2, 3, 0.04699, 0.19797),
        (2, 4, 0.05811, 0.17632),
        (2, 5, 0.05695, 0.17388),
        (3, 4, 0.06701, 0.17103),
        (4, 5, 0.01335, 0.04211),
        (4, 7, 0.0, 0.20912),
        (4, 9, 0.0, 0.55618),
        (5, 6, 0.0, 0.25202),
        (6, 11, 0.09498, 0.19890),
        (6, 12, 0.12291, 0.25581),
        (6, 13, 0.06615, 0.13027),
        (7, 8, 0.0, 0.17615),
        (7, 9, 0.0, 0.11001),
        (9, 10, 0.03181, 0.08450),
        (9, 14, 0.12711, 0.27038),
        (10, 11, 0.08205, 0.19207),
        (12, 13, 0.22092, 0.19988),
        (13, 14, 0.17093, 0.34802),
    ];

    DATA.iter()
        .map(|&(from, to, r, x)| {
            Branch::new(
                format!("{from}-{to}"),
                format!("Bus {from}"),
                format!("Bus {to}"),
                r,
                x,
            )
        })
        .collect()
}

/// Three buses `A`, `B`, `C` in a ring: `A-B`, `B-C`, `A-C`.
pub fn triangle() -> (Vec<Bus>, Vec<Branch>) {
    let buses = ["A", "B", "C"]
        .into_iter()
        .map(|name| Bus::new(name, Kilovolts(138.0)))
        .collect();
    let branches = vec![
        Branch::new("A-B", "A", "B", 0.0, 0.1),
        Branch::new("B-C", "B", "C", 0.0, 0.2),
        Branch::new("A-C", "A", "C", 0.0, 0.25),
    ];
    (buses, branches)
}
