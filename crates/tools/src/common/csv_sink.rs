//! 抽出結果の CSV / JSONL 出力

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use sgf_game_info::GameRecord;

use super::io::open_writer;

/// ヘッダ（先頭レコードのフィールド名）+ 1 行 1 レコードで書き出す。
///
/// 空のシーケンスと、先頭とフィールド構成が違うレコードはエラー。
pub fn write_records_csv<W: Write>(out: W, records: &[GameRecord]) -> Result<()> {
    let Some(first) = records.first() else {
        bail!("no records to write");
    };
    let header: Vec<&str> = first.keys().collect();

    let mut w = csv::Writer::from_writer(out);
    w.write_record(&header)?;
    for (idx, record) in records.iter().enumerate() {
        ensure!(
            record.keys().eq(header.iter().copied()),
            "record {idx} has different fields from the header"
        );
        w.write_record(record.values().map(|v| v.to_string()))?;
    }
    w.flush()?;
    Ok(())
}

/// 1 行 1 JSON オブジェクト（フィールド順は保持）
pub fn write_records_jsonl<W: Write>(mut out: W, records: &[GameRecord]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// `path` に CSV を書く（`-` は標準出力、`.gz` は圧縮）。
pub fn write_csv_file(path: &Path, records: &[GameRecord]) -> Result<()> {
    let mut out =
        open_writer(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_records_csv(&mut out, records)
        .with_context(|| format!("failed to write {}", path.display()))?;
    out.close().with_context(|| format!("failed to close {}", path.display()))?;
    Ok(())
}

/// `path` に JSONL を書く
pub fn write_jsonl_file(path: &Path, records: &[GameRecord]) -> Result<()> {
    let mut out =
        open_writer(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_records_jsonl(&mut out, records)
        .with_context(|| format!("failed to write {}", path.display()))?;
    out.close().with_context(|| format!("failed to close {}", path.display()))?;
    Ok(())
}
