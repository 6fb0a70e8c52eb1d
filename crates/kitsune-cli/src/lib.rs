//! # Kitsune CLI Library
//!
//! 固定ドメイン推論器のコマンドラインインターフェース

pub mod commands;

pub use commands::*;
