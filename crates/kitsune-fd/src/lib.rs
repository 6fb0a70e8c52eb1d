//! # Kitsune FD
//!
//! 固定ドメイン意味論による記述論理推論
//! 公理を解集合プログラムへ翻訳し、ソルバーで一貫性・含意・モデルを判定します

pub mod axiomatize;
pub mod config;
pub mod domain;
pub mod enumerate;
pub mod mapper;
pub mod query;
pub mod reasoner;
pub mod translate;

pub use axiomatize::axiomatize;
pub use config::{MapperKind, ReasonerConfig, SolverBackend, SolverConfig, Strategy};
pub use domain::Domain;
pub use enumerate::{Model, ModelEnumerator};
pub use mapper::{AspCoreMapper, SanitizingMapper, SignatureMapper};
pub use reasoner::FixedDomainReasoner;
pub use translate::{TranslationContext, Translation};

use kitsune_asp::SolverError;
use kitsune_owl::OwlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FdError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported construct in {axiom}: {reason}")]
    Unsupported { axiom: String, reason: String },

    #[error("Domain of {size} elements exceeds the limit of {limit}")]
    DomainTooLarge { size: usize, limit: usize },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Ontology error: {0}")]
    Ontology(#[from] OwlError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
