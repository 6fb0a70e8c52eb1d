//! OWL 2 オントロジーモデル
//!
//! このクレートは固定ドメイン推論の入力側を提供します:
//! - 公理・クラス式・プロパティ式の閉じた代数的データ型
//! - OWL 2 関数型構文のパーサーとライター
//! - ファイル/ディレクトリからのオントロジーローダー (imports 解決付き)

pub mod loader;
pub mod model;
pub mod parser;
pub mod writer;

pub use loader::{FileOntologyLoader, OntologyLoader};
pub use model::{Axiom, ClassExpression, Entity, Individual, Ontology, OwlIri, PropertyExpression};
pub use parser::parse_ontology;
pub use writer::write_ontology;

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OwlError {
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Loader error: {0}")]
    Loader(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
