//! リモートサーバからの棋譜取得（ssh / scp）
//!
//! `~/.ssh/config` でパスワード無しに接続できる前提。コマンドは外部プロセスとして
//! 実行し、標準エラーに何か出たら失敗扱いにする。

use std::fmt;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

use super::content::Section;

/// 外部コマンド 1 つ分
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RemoteCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// `scp <server>:<path> <dest>`
pub fn copy_file_command(server: &str, path: &str, dest: &Path) -> RemoteCommand {
    RemoteCommand::new(
        "scp",
        [format!("{server}:{path}"), dest.to_string_lossy().into_owned()],
    )
}

/// `ssh <server> ls <dir> | head -<limit>`（パイプはリモート側で解釈される）
pub fn list_dir_command(server: &str, dir: &str, limit: usize) -> RemoteCommand {
    RemoteCommand::new(
        "ssh",
        [server.to_string(), "ls".into(), dir.to_string(), "|".into(), "head".into(), format!("-{limit}")],
    )
}

/// 一覧で得たファイルをまとめて 1 回の `scp -r` で取得する
pub fn copy_listed_command(server: &str, dir: &str, files: &[String], dest: &Path) -> RemoteCommand {
    let dir = dir.trim_end_matches('/');
    let mut args = vec!["-r".to_string()];
    args.extend(files.iter().map(|f| format!("{server}:{dir}/{f}")));
    args.push(dest.to_string_lossy().into_owned());
    RemoteCommand::new("scp", args)
}

/// コマンド実行器。`dry_run` のときはログに出すだけで実行しない。
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandRunner {
    pub dry_run: bool,
}

impl CommandRunner {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// 実行して標準出力を返す（dry-run なら `None`）
    pub fn run(&self, cmd: &RemoteCommand) -> Result<Option<String>> {
        if self.dry_run {
            log::info!("Would run command: {cmd}");
            return Ok(None);
        }
        log::info!("Running command: {cmd}");
        let output = Command::new(&cmd.program)
            .args(&cmd.args)
            .output()
            .with_context(|| format!("failed to spawn `{cmd}`"))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            bail!("`{cmd}` reported an error: {}", stderr.trim());
        }
        if !output.status.success() {
            bail!("`{cmd}` exited with {}", output.status);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

fn is_sgf_path(path: &str) -> bool {
    path.contains(".sgf")
}

/// セクションの棋譜を `dest` に取得し、取得したとみなす局数を返す。
///
/// `.sgf` を含むパスはファイル 1 つ（1 局）として、それ以外はディレクトリとして
/// 先頭 `max_games - 取得済み` 件を取得する。
pub fn stage_section(section: &Section, dest: &Path, runner: &CommandRunner) -> Result<usize> {
    let mut games_count = 0usize;
    for path in &section.paths {
        if games_count >= section.max_games {
            break;
        }
        if is_sgf_path(path) {
            runner.run(&copy_file_command(&section.server, path, dest))?;
            games_count += 1;
            continue;
        }

        let limit = section.max_games - games_count;
        let Some(listing) = runner.run(&list_dir_command(&section.server, path, limit))? else {
            continue;
        };
        let files: Vec<String> = listing
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .take(limit)
            .map(str::to_string)
            .collect();
        if files.is_empty() {
            log::warn!("no files listed under {}:{path}", section.server);
            continue;
        }
        runner.run(&copy_listed_command(&section.server, path, &files, dest))?;
        games_count += files.len();
    }
    log::debug!("staged {games_count} entries for section '{}'", section.title);
    Ok(games_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(paths: &[&str], max_games: usize) -> Section {
        Section {
            server: "host".to_string(),
            title: "t".to_string(),
            max_games,
            dir_name: "d".to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_command_builders() {
        let dest = Path::new("/tmp/out");
        assert_eq!(copy_file_command("host", "/g/a.sgf", dest).to_string(), "scp host:/g/a.sgf /tmp/out");
        assert_eq!(list_dir_command("host", "/g/dir", 3).to_string(), "ssh host ls /g/dir | head -3");
        let files = vec!["x.sgfs".to_string(), "y.sgfs".to_string()];
        assert_eq!(
            copy_listed_command("host", "/g/dir/", &files, dest).to_string(),
            "scp -r host:/g/dir/x.sgfs host:/g/dir/y.sgfs /tmp/out"
        );
    }

    #[test]
    fn test_dry_run_respects_max_games() {
        let runner = CommandRunner::new(true);
        let dest = Path::new("/tmp/out");
        let s = section(&["/g/a.sgf", "/g/b.sgf", "/g/c.sgf"], 2);
        assert_eq!(stage_section(&s, dest, &runner).unwrap(), 2);

        // ディレクトリは dry-run では一覧が得られないので数えない
        let s = section(&["/g/dir", "/g/a.sgf"], 5);
        assert_eq!(stage_section(&s, dest, &runner).unwrap(), 1);
    }

    #[test]
    fn test_stderr_is_error() {
        let runner = CommandRunner::new(false);
        let cmd = RemoteCommand::new("sh", ["-c", "echo oops >&2"]);
        let err = runner.run(&cmd).unwrap_err();
        assert!(err.to_string().contains("oops"));

        let cmd = RemoteCommand::new("sh", ["-c", "echo fine"]);
        assert_eq!(runner.run(&cmd).unwrap().as_deref(), Some("fine\n"));
    }
}
