use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use tracing::debug;

use crate::buffer::Buffer;
use crate::error::{Error, Result};

pub struct FileIO;

impl FileIO {
    /// ファイルを読み込み専用で開き、`\n` 区切りで 1 行ずつバッファに追加する
    ///
    /// 末尾に改行のない最終行もそのまま 1 行として扱う。空ファイルは 0 行。
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Buffer> {
        let path = path.as_ref();
        let open_error = |source| Error::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(open_error)?;
        let mut buffer = Buffer::new();

        for line in BufReader::new(file).split(b'\n') {
            buffer.append_row(line.map_err(open_error)?);
        }

        debug!(path = %path.display(), lines = buffer.len(), "file loaded");
        Ok(buffer)
    }

    /// パスが指定されていなければ空バッファ (ウェルカム画面)
    pub fn load(path: Option<&Path>) -> Result<Buffer> {
        match path {
            Some(path) => Self::open(path),
            None => Ok(Buffer::new()),
        }
    }
}
