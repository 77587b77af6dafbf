use std::io::{self, Write};

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::terminal::ScreenSize;
use crate::{PRODUCT_NAME, VERSION};

pub struct Screen;

impl Screen {
    pub fn welcome_message() -> String {
        format!("{} -- version {}", PRODUCT_NAME, VERSION)
    }

    /// ウェルカムバナーを中央寄せで描画する (画面幅に収まらなければ切り詰める)
    pub fn draw_welcome(frame: &mut Vec<u8>, message: &str, cols: usize) {
        let message = &message.as_bytes()[..message.len().min(cols)];
        let mut padding = (cols - message.len()) / 2;
        if padding > 0 {
            frame.push(b'~');
            padding -= 1;
        }
        frame.extend(std::iter::repeat_n(b' ', padding));
        frame.extend_from_slice(message);
    }

    pub fn draw_rows(frame: &mut Vec<u8>, size: ScreenSize, buffer: &Buffer, cursor: &Cursor) {
        let rows = size.rows as usize;
        let cols = size.cols as usize;

        for i in 0..rows {
            let file_row = i + cursor.row_offset();

            if let Some(row) = buffer.row(file_row) {
                // 制御文字もそのまま出力する
                frame.extend_from_slice(row.visible(cursor.col_offset(), cols));
            } else if buffer.is_empty() && i == rows / 3 {
                Self::draw_welcome(frame, &Self::welcome_message(), cols);
            } else {
                // ファイルの終端を超えたら ~ を表示
                frame.push(b'~');
            }

            // 行末までクリア
            let _ = write!(frame, "{}", termion::clear::UntilNewline);
            // 最終行では改行しない (画面がスクロールしてしまう)
            if i < rows - 1 {
                frame.extend_from_slice(b"\r\n");
            }
        }
    }

    /// 1 フレーム分を組み立てる
    pub fn compose(size: ScreenSize, buffer: &Buffer, cursor: &Cursor) -> Vec<u8> {
        let mut frame = Vec::new();

        // カーソルを隠す
        let _ = write!(frame, "{}", termion::cursor::Hide);
        // カーソルを左上に移動
        let _ = write!(frame, "{}", termion::cursor::Goto(1, 1));

        Self::draw_rows(&mut frame, size, buffer, cursor);

        // カーソル位置に移動 (1-based)
        let y = cursor.screen_row() + 1;
        let x = cursor.column().saturating_sub(cursor.col_offset()) + 1;
        let _ = write!(frame, "\x1b[{};{}H", y, x);

        // カーソル表示
        let _ = write!(frame, "{}", termion::cursor::Show);
        frame
    }

    /// 組み立てたフレームを 1 回の write でまとめて出力する
    pub fn refresh(
        stdout: &mut impl Write,
        size: ScreenSize,
        buffer: &Buffer,
        cursor: &Cursor,
    ) -> io::Result<()> {
        let frame = Self::compose(size, buffer, cursor);
        stdout.write_all(&frame)?;
        stdout.flush()
    }
}
