//! 棋譜取得・抽出・公開用の共通モジュール

pub mod batch;
pub mod content;
pub mod csv_sink;
pub mod discover;
pub mod io;
pub mod redact;
pub mod staging;
pub mod viz;
