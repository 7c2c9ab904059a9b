//! SGF ファイルの再帰探索

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// 探索するディレクトリ数の既定上限
pub const DEFAULT_MAX_SCAN_LENGTH: usize = 10_000;

/// `.sgf` / `.sgfs` で終わるファイル名か
pub fn is_sgf_file_name(name: &str) -> bool {
    name.ends_with(".sgf") || name.ends_with(".sgfs")
}

fn warn_cutoff(root: &Path, max_scan_length: usize) {
    log::warn!(
        "Reached max_scan_length, {max_scan_length}, while scanning subdirectories in {}. \
         SGF files already found will be returned.",
        root.display()
    );
}

/// `root` 以下の SGF ファイルを再帰的に集める。
///
/// ディレクトリごとに直下のファイルを先に、サブディレクトリを後に（それぞれ
/// 名前順で）たどる。ディレクトリは直下のファイルを集め終えた時点で 1 つ
/// 走査済みと数え、`max_scan_length` に達したら警告を出してそこまでの
/// ファイルを返す。
pub fn find_sgf_files(root: &Path, max_scan_length: usize) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut dirs_scanned = 0usize;
    let mut in_dir = false;
    let walker = WalkDir::new(root).sort_by(|a, b| {
        a.file_type()
            .is_dir()
            .cmp(&b.file_type().is_dir())
            .then_with(|| a.file_name().cmp(b.file_name()))
    });
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::debug!("skip unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        if entry.file_type().is_dir() {
            // 直前のディレクトリのファイルはここまでで出揃っている
            if in_dir {
                dirs_scanned += 1;
                if dirs_scanned >= max_scan_length {
                    warn_cutoff(root, max_scan_length);
                    return files;
                }
            }
            in_dir = true;
            continue;
        }
        if entry.file_type().is_file() && entry.file_name().to_str().is_some_and(is_sgf_file_name) {
            files.push(entry.into_path());
        }
    }
    if in_dir {
        dirs_scanned += 1;
        if dirs_scanned >= max_scan_length {
            warn_cutoff(root, max_scan_length);
        }
    }
    files
}
