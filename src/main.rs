use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use zilo::editor::Editor;
use zilo::logger;
use zilo::terminal::Terminal;

/// CLI 引数
#[derive(Parser, Debug)]
#[command(name = "zilo", version, about = "Minimal terminal text viewer")]
struct Args {
    /// 起動時に読み込むファイル (省略時はウェルカム画面)
    path: Option<PathBuf>,
}

fn run(args: &Args) -> zilo::Result<()> {
    let mut terminal = Terminal::enter()?;
    let mut editor = Editor::open(args.path.as_deref(), terminal.size())?;
    editor.run(&mut std::io::stdin(), terminal.stdout())
    // ここで terminal が drop され、画面クリアと端末設定の復元が行われる
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = logger::init(Path::new("."));
    logger::install_panic_hook();
    info!(path = ?args.path, "startup");

    match run(&args) {
        Ok(()) => Ok(()),
        Err(zilo::Error::NotATerminal) => {
            eprintln!("zilo: standard input is not a terminal");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "fatal");
            Err(e.into())
        }
    }
}
