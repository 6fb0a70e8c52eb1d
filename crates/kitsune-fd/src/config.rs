//! Reasoner configuration

use crate::FdError;
use kitsune_asp::{BuiltinSolver, ClingoSolver, Solver};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Translation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One generic, fully grounded encoding per axiom kind
    #[default]
    Naive,
    /// Structural recursion with count aggregates
    Direct,
    /// Naive encoding with every rule tagged by its source axiom
    #[serde(alias = "naff")]
    Debug,
}

impl FromStr for Strategy {
    type Err = FdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "naive" => Ok(Strategy::Naive),
            "direct" => Ok(Strategy::Direct),
            "debug" | "naff" => Ok(Strategy::Debug),
            other => Err(FdError::Configuration(format!("unknown translation strategy '{}'", other))),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Naive => "naive",
            Strategy::Direct => "direct",
            Strategy::Debug => "debug",
        };
        write!(f, "{}", name)
    }
}

/// Program symbol naming scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapperKind {
    /// Sanitized local names
    #[default]
    Default,
    /// `c_`/`r_` prefixed predicates and quoted IRI constants
    AspCore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverBackend {
    #[default]
    Builtin,
    Clingo,
}

impl FromStr for SolverBackend {
    type Err = FdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "builtin" => Ok(SolverBackend::Builtin),
            "clingo" => Ok(SolverBackend::Clingo),
            other => Err(FdError::Configuration(format!("unknown solver backend '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    pub clingo_path: PathBuf,
    /// Extra arguments for the external solver
    pub args: Vec<String>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Builtin,
            clingo_path: PathBuf::from("clingo"),
            args: Vec::new(),
        }
    }
}

impl SolverConfig {
    pub fn build(&self) -> Box<dyn Solver> {
        match self.backend {
            SolverBackend::Builtin => Box::new(BuiltinSolver::new()),
            SolverBackend::Clingo => {
                Box::new(ClingoSolver::new(&self.clingo_path).with_args(self.args.clone()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    pub strategy: Strategy,
    pub mapper: MapperKind,
    /// Budget per solver call
    pub timeout_ms: Option<u64>,
    /// Refuse domains larger than this
    pub max_domain_size: Option<usize>,
    /// Class IRIs that model output is restricted to
    pub projection: Vec<String>,
    pub solver: SolverConfig,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Naive,
            mapper: MapperKind::Default,
            timeout_ms: None,
            max_domain_size: None,
            projection: Vec::new(),
            solver: SolverConfig::default(),
        }
    }
}

impl ReasonerConfig {
    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, FdError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FdError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| FdError::Configuration(format!("invalid config {}: {}", path.display(), e)))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ReasonerConfig::default();
        assert_eq!(config.strategy, Strategy::Naive);
        assert_eq!(config.solver.backend, SolverBackend::Builtin);
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
strategy = "naff"
mapper = "asp-core"
timeout_ms = 1500
projection = ["http://e.org/A"]

[solver]
backend = "clingo"
args = ["--parallel-mode=2"]
"#
        )
        .unwrap();

        let config = ReasonerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.strategy, Strategy::Debug);
        assert_eq!(config.mapper, MapperKind::AspCore);
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.solver.backend, SolverBackend::Clingo);
        assert_eq!(config.solver.clingo_path, PathBuf::from("clingo"));
        assert_eq!(config.max_domain_size, None);
    }

    #[test]
    fn test_invalid_config_is_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "strategy = \"clever\"").unwrap();
        assert!(matches!(
            ReasonerConfig::from_file(file.path()),
            Err(FdError::Configuration(_))
        ));
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!("naff".parse::<Strategy>().unwrap(), Strategy::Debug);
        assert_eq!("Direct".parse::<Strategy>().unwrap(), Strategy::Direct);
        assert!("tableau".parse::<Strategy>().is_err());
    }
}
