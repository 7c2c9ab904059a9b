//! SGF 対局情報の一括抽出・公開ツール
//!
//! - `common::discover` / `common::batch`: SGF ファイルの探索と並列解析
//! - `common::csv_sink`: CSV / JSONL 出力
//! - `common::redact` / `common::viz`: ビューア向けの匿名化とリンク生成
//! - `common::content` / `common::staging`: ビューア用データのリモート取得

pub mod common;
