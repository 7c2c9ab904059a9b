//! 棋譜ファイルの指定行を SGF ビューアで開くリンクを表示する

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tools::common::viz::viz_link;

#[derive(Parser, Debug)]
#[command(author, version, about = "Print an sgf-viewer link for one game")]
struct Cli {
    /// SGF / SGFS ファイル
    path: PathBuf,

    /// 行番号（1 始まり）
    line: usize,

    /// コメント C[...] を残す
    #[arg(long)]
    no_minimize: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    println!("{}", viz_link(&cli.path, cli.line, !cli.no_minimize)?);
    Ok(())
}
