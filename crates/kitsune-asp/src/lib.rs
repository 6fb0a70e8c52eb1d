//! # Kitsune ASP
//!
//! 基底論理プログラムと解集合ソルバー
//! - clingo 構文で出力できるプログラム表現
//! - 組み込みの安定モデル探索ソルバー
//! - 外部 clingo プロセスのバックエンド

pub mod builtin;
pub mod clingo;
pub mod program;
pub mod solver;

pub use builtin::BuiltinSolver;
pub use clingo::ClingoSolver;
pub use program::{Aggregate, AggregateElement, Atom, CmpOp, Literal, Program, Rule, Statement};
pub use solver::{AnswerSet, CancelToken, SolveOptions, Solver};

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Solver unavailable: {0}")]
    Unavailable(String),

    #[error("Solver crashed ({status}): {stderr}")]
    Crashed { status: String, stderr: String },

    #[error("Solver timed out after {0:?}")]
    Timeout(Duration),

    #[error("Solver call cancelled")]
    Cancelled,

    #[error("Invalid program: {0}")]
    InvalidProgram(String),

    #[error("Unreadable solver output: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
