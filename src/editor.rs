use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::QUIT_KEY;
use crate::buffer::Buffer;
use crate::cursor::{Cursor, Direction};
use crate::error::Result;
use crate::file_io::FileIO;
use crate::key::{self, ByteSource, Key};
use crate::screen::Screen;
use crate::terminal::ScreenSize;

pub struct Editor {
    buffer: Buffer,
    cursor: Cursor,
    size: ScreenSize,
}

impl Editor {
    pub fn new(size: ScreenSize) -> Self {
        Self::from_buffer(Buffer::new(), size)
    }

    pub fn from_buffer(buffer: Buffer, size: ScreenSize) -> Self {
        Self {
            buffer,
            cursor: Cursor::new(),
            size,
        }
    }

    /// ファイルを開く (パスがなければ空バッファのまま)
    pub fn open(path: Option<&Path>, size: ScreenSize) -> Result<Self> {
        let buffer = FileIO::load(path)?;
        Ok(Self::from_buffer(buffer, size))
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn refresh_screen(&mut self, stdout: &mut impl Write) -> Result<()> {
        // 描画の直前に 1 回だけスクロール位置を調整する
        self.cursor.scroll(self.size.rows as usize);
        Screen::refresh(stdout, self.size, &self.buffer, &self.cursor)?;
        Ok(())
    }

    /// キー入力を処理する。終了する場合は false を返す
    pub fn process_key(&mut self, key: Key) -> bool {
        let line_count = self.buffer.len();
        let cols = self.size.cols as usize;

        match key {
            Key::Char(QUIT_KEY) => return false,
            Key::Up => self.cursor.step(Direction::Up, self.size, line_count),
            Key::Down => self.cursor.step(Direction::Down, self.size, line_count),
            Key::Left => self.cursor.step(Direction::Left, self.size, line_count),
            Key::Right => self.cursor.step(Direction::Right, self.size, line_count),
            Key::PageUp => self.cursor.page(Direction::Up, self.size, line_count),
            Key::PageDown => self.cursor.page(Direction::Down, self.size, line_count),
            Key::Home => self.cursor.move_home(),
            Key::End => self.cursor.move_end(cols),
            // 編集操作はない
            Key::Delete | Key::Char(_) => {}
        }
        true
    }

    /// 描画 → キー読み込み → カーソル移動 を終了キーまで繰り返す
    pub fn run<S, W>(&mut self, input: &mut S, stdout: &mut W) -> Result<()>
    where
        S: ByteSource + ?Sized,
        W: Write,
    {
        info!(
            rows = self.size.rows,
            cols = self.size.cols,
            lines = self.buffer.len(),
            "editor loop started"
        );
        write!(stdout, "{}", termion::clear::All)?;

        loop {
            self.refresh_screen(stdout)?;

            let Some(key) = key::read_key(input)? else {
                continue;
            };
            debug!(?key, "key");
            if !self.process_key(key) {
                break;
            }
        }

        info!("quit");
        Ok(())
    }
}
