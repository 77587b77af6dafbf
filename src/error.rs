use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// 標準入力が端末ではない
    #[error("standard input is not a terminal")]
    NotATerminal,

    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// カーソル位置レポートの解析に失敗 (不正な部分文字列を保持)
    #[error("malformed cursor position report: {0:?}")]
    CursorReport(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
