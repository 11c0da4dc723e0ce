//! Grid-system containers for the two market horizons.
//!
//! A [`GridSystem`] is either a day-ahead or a real-time model of the same
//! network data. Both carry a lazily computed PTDF: the first call to
//! [`GridSystem::ptdf`] computes and stores it, later calls reuse it, and
//! anything that changes the result ([`GridSystem::set_config`],
//! [`GridSystem::set_branches`]) or an explicit
//! [`GridSystem::invalidate_ptdf`] drops it again.

use crate::config::SensitivityConfig;
use crate::contingency::{compute_lodf, LodfMatrix};
use crate::error::SensitivityError;
use crate::sensitivity::{compute_ptdf, PtdfMatrix};
use gridsens_core::{validate_network, Branch, Bus, Diagnostics};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Market horizon a system is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    DayAhead,
    RealTime,
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::DayAhead => write!(f, "day-ahead"),
            Market::RealTime => write!(f, "real-time"),
        }
    }
}

/// Network data shared by both horizons.
#[derive(Debug, Clone)]
pub struct GridData {
    name: String,
    buses: Vec<Bus>,
    branches: Vec<Branch>,
    config: SensitivityConfig,
    ptdf: Option<PtdfMatrix>,
}

impl GridData {
    pub fn new(name: impl Into<String>, buses: Vec<Bus>, branches: Vec<Branch>) -> Self {
        Self {
            name: name.into(),
            buses,
            branches,
            config: SensitivityConfig::default(),
            ptdf: None,
        }
    }

    pub fn with_config(mut self, config: SensitivityConfig) -> Self {
        self.config = config;
        self
    }

    fn ptdf(&mut self) -> Result<&PtdfMatrix, SensitivityError> {
        let ptdf = match self.ptdf.take() {
            Some(ptdf) => ptdf,
            None => self.compute_ptdf()?,
        };
        let cached: &PtdfMatrix = self.ptdf.insert(ptdf);
        Ok(cached)
    }

    fn lodf<S: AsRef<str>>(&mut self, outaged: &[S]) -> Result<LodfMatrix, SensitivityError> {
        let ptdf = match self.ptdf.take() {
            Some(ptdf) => ptdf,
            None => self.compute_ptdf()?,
        };
        let lodf = compute_lodf(&self.buses, &self.branches, &ptdf, outaged);
        self.ptdf = Some(ptdf);
        lodf
    }

    fn compute_ptdf(&self) -> Result<PtdfMatrix, SensitivityError> {
        debug!(system = %self.name, "PTDF not cached, computing");
        compute_ptdf(&self.buses, &self.branches, &self.config)
    }

    fn invalidate(&mut self) {
        if self.ptdf.take().is_some() {
            debug!(system = %self.name, "cached PTDF invalidated");
        }
    }
}

/// Day-ahead model: `periods` hourly intervals.
#[derive(Debug, Clone)]
pub struct DayAheadSystem {
    pub data: GridData,
    pub periods: usize,
}

/// Real-time model: a single dispatch interval.
#[derive(Debug, Clone)]
pub struct RealTimeSystem {
    pub data: GridData,
    pub interval_minutes: u32,
}

#[derive(Debug, Clone)]
pub enum GridSystem {
    DayAhead(DayAheadSystem),
    RealTime(RealTimeSystem),
}

impl GridSystem {
    pub fn day_ahead(data: GridData, periods: usize) -> Self {
        GridSystem::DayAhead(DayAheadSystem { data, periods })
    }

    pub fn real_time(data: GridData, interval_minutes: u32) -> Self {
        GridSystem::RealTime(RealTimeSystem {
            data,
            interval_minutes,
        })
    }

    fn data(&self) -> &GridData {
        match self {
            GridSystem::DayAhead(s) => &s.data,
            GridSystem::RealTime(s) => &s.data,
        }
    }

    fn data_mut(&mut self) -> &mut GridData {
        match self {
            GridSystem::DayAhead(s) => &mut s.data,
            GridSystem::RealTime(s) => &mut s.data,
        }
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn market(&self) -> Market {
        match self {
            GridSystem::DayAhead(_) => Market::DayAhead,
            GridSystem::RealTime(_) => Market::RealTime,
        }
    }

    pub fn buses(&self) -> &[Bus] {
        &self.data().buses
    }

    pub fn branches(&self) -> &[Branch] {
        &self.data().branches
    }

    pub fn config(&self) -> &SensitivityConfig {
        &self.data().config
    }

    pub fn bus_names(&self) -> Vec<&str> {
        self.buses().iter().map(|b| b.name.as_str()).collect()
    }

    pub fn monitored_branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches().iter().filter(|b| b.monitored)
    }

    /// Minutes covered by the model.
    pub fn horizon_minutes(&self) -> u64 {
        match self {
            GridSystem::DayAhead(s) => s.periods as u64 * 60,
            GridSystem::RealTime(s) => u64::from(s.interval_minutes),
        }
    }

    /// The PTDF if it has already been computed.
    pub fn cached_ptdf(&self) -> Option<&PtdfMatrix> {
        self.data().ptdf.as_ref()
    }

    /// The PTDF, computed on first use.
    pub fn ptdf(&mut self) -> Result<&PtdfMatrix, SensitivityError> {
        self.data_mut().ptdf()
    }

    pub fn invalidate_ptdf(&mut self) {
        self.data_mut().invalidate();
    }

    /// LODFs for an outage set, computing the PTDF first if needed.
    pub fn lodf<S: AsRef<str>>(&mut self, outaged: &[S]) -> Result<LodfMatrix, SensitivityError> {
        self.data_mut().lodf(outaged)
    }

    pub fn set_config(&mut self, config: SensitivityConfig) {
        let data = self.data_mut();
        data.config = config;
        data.invalidate();
    }

    pub fn set_branches(&mut self, branches: Vec<Branch>) {
        let data = self.data_mut();
        data.branches = branches;
        data.invalidate();
    }

    /// Pre-flight checks on the system's network. Warnings are also
    /// emitted through `tracing`.
    pub fn validate(&self) -> Diagnostics {
        let diagnostics = validate_network(self.buses(), self.branches());
        diagnostics.log();
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::triangle;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn triangle_system() -> GridSystem {
        let (buses, branches) = triangle();
        GridSystem::real_time(GridData::new("tri", buses, branches), 5)
    }

    #[test]
    fn test_common_accessors() {
        let (buses, branches) = triangle();
        let system = GridSystem::day_ahead(
            GridData::new("tri-da", buses, vec![branches[0].clone().monitored()]),
            24,
        );
        assert_eq!(system.name(), "tri-da");
        assert_eq!(system.market(), Market::DayAhead);
        assert_eq!(system.bus_names(), vec!["A", "B", "C"]);
        assert_eq!(system.monitored_branches().count(), 1);
        assert_eq!(system.horizon_minutes(), 24 * 60);
        assert_eq!(triangle_system().horizon_minutes(), 5);
    }

    #[test]
    fn test_ptdf_is_cached_until_invalidated() {
        let mut system = triangle_system();
        assert!(system.cached_ptdf().is_none());

        let first = system.ptdf().unwrap().clone();
        assert_eq!(system.cached_ptdf(), Some(&first));

        system.invalidate_ptdf();
        assert!(system.cached_ptdf().is_none());
        assert_eq!(system.ptdf().unwrap(), &first);
    }

    #[test]
    fn test_config_change_drops_cache() {
        let mut system = triangle_system();
        system.ptdf().unwrap();
        system.set_config(SensitivityConfig::default().with_reference_bus("B"));
        assert!(system.cached_ptdf().is_none());
        assert_eq!(system.ptdf().unwrap().reference_bus(), "B");
    }

    #[test]
    fn test_lodf_populates_cache() {
        let mut system = triangle_system();
        let lodf = system.lodf(&["A-B"]).unwrap();
        assert_eq!(lodf.num_outages(), 1);
        assert!(system.cached_ptdf().is_some());
    }

    #[test]
    fn test_failed_ptdf_leaves_cache_empty() {
        let mut system = triangle_system();
        system.set_config(SensitivityConfig::default().with_reference_bus("nowhere"));
        assert!(system.ptdf().is_err());
        assert!(system.cached_ptdf().is_none());
    }

    #[test]
    fn test_validate_flags_missing_monitored_branch() {
        let system = triangle_system();
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || SharedBuffer(Arc::clone(&sink)))
            .with_ansi(false)
            .finish();

        let diagnostics = tracing::subscriber::with_default(subscriber, || system.validate());
        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.warning_count(), 1);

        let logged = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("WARN"), "{}", logged);
        assert!(logged.contains("no branch is monitored"), "{}", logged);
    }

    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
