use std::io::{self, Stdout, Write};
use std::os::unix::io::RawFd;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::key::ByteSource;
use crate::{CURSOR_REPORT_MAX, ESC, PROBE_DISTANCE, READ_TIMEOUT_DECISECONDS};

/// 端末の大きさ (文字セル単位)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub rows: u16,
    pub cols: u16,
}

/// raw mode 用に端末属性を書き換える
///
/// 行バッファリング・エコー・シグナル生成・拡張入力処理・フロー制御・
/// CR→LF 変換・出力後処理を無効にし、read は 0 バイト / 100ms で戻る。
pub fn raw_attributes(original: &libc::termios) -> libc::termios {
    let mut raw = *original;
    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = READ_TIMEOUT_DECISECONDS;
    raw
}

/// raw mode の有効期間を表すガード
///
/// drop 時に元の端末属性を 1 度だけ復元する。
pub struct RawMode {
    fd: RawFd,
    original: libc::termios,
}

impl RawMode {
    pub fn enable(fd: RawFd) -> Result<Self> {
        // SAFETY: isatty は任意の fd に対して安全に呼べる
        if unsafe { libc::isatty(fd) } == 0 {
            return Err(Error::NotATerminal);
        }

        // SAFETY: termios は C の POD 構造体で、ゼロ初期化後に tcgetattr が埋める
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
            return Err(io::Error::last_os_error().into());
        }

        let raw = raw_attributes(&original);
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw) } != 0 {
            return Err(io::Error::last_os_error().into());
        }

        info!(fd, "raw mode enabled");
        Ok(Self { fd, original })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        // SAFETY: original は enable 時に tcgetattr で取得した値
        if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, &self.original) } != 0 {
            warn!(error = %io::Error::last_os_error(), "failed to restore terminal mode");
        } else {
            info!(fd = self.fd, "terminal mode restored");
        }
    }
}

pub struct Terminal {
    stdout: Stdout,
    size: ScreenSize,
    // Terminal の drop (画面クリア) の後に復元される
    _raw: RawMode,
}

impl Terminal {
    /// 標準入力を raw mode にして画面サイズを取得する
    ///
    /// 標準入力が端末でなければ [`Error::NotATerminal`] (端末は変更しない)。
    pub fn enter() -> Result<Self> {
        let raw = RawMode::enable(libc::STDIN_FILENO)?;
        let mut terminal = Self {
            stdout: io::stdout(),
            size: ScreenSize { rows: 1, cols: 1 },
            _raw: raw,
        };
        // 失敗した場合も terminal の drop で元に戻る
        terminal.size = query_size(&mut io::stdin(), &mut terminal.stdout)?;
        Ok(terminal)
    }

    pub fn stdout(&mut self) -> &mut Stdout {
        &mut self.stdout
    }

    pub fn size(&self) -> ScreenSize {
        self.size
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        clear_screen(&mut self.stdout)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        // 終了時の画面クリア
        if let Err(error) = self.clear_screen() {
            warn!(%error, "failed to clear screen");
        }
    }
}

/// 画面全体を消去してカーソルを左上に戻す
pub fn clear_screen<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    write!(
        out,
        "{}{}",
        termion::clear::All,
        termion::cursor::Goto(1, 1)
    )?;
    out.flush()
}

/// 画面サイズを取得する
///
/// OS への問い合わせが成功すればその値を使い、失敗した場合だけ
/// カーソル位置レポートによる推定を行う。
pub fn query_size<S, W>(input: &mut S, output: &mut W) -> Result<ScreenSize>
where
    S: ByteSource + ?Sized,
    W: Write + ?Sized,
{
    match termion::terminal_size() {
        Ok((cols, rows)) if cols > 0 && rows > 0 => {
            debug!(rows, cols, "screen size from ioctl");
            Ok(ScreenSize { rows, cols })
        }
        _ => {
            let size = probe_size(input, output)?;
            debug!(rows = size.rows, cols = size.cols, "screen size from cursor probe");
            Ok(size)
        }
    }
}

/// カーソルを右下端へ移動させ、その位置を問い合わせて画面サイズとする
pub fn probe_size<S, W>(input: &mut S, output: &mut W) -> Result<ScreenSize>
where
    S: ByteSource + ?Sized,
    W: Write + ?Sized,
{
    write!(
        output,
        "{}{}",
        termion::cursor::Right(PROBE_DISTANCE),
        termion::cursor::Down(PROBE_DISTANCE)
    )?;
    cursor_position(input, output)
}

/// `ESC [ 6 n` を送り、`ESC [ rows ; cols R` の応答を読む
pub fn cursor_position<S, W>(input: &mut S, output: &mut W) -> Result<ScreenSize>
where
    S: ByteSource + ?Sized,
    W: Write + ?Sized,
{
    output.write_all(b"\x1b[6n")?;
    output.flush()?;

    let mut reply = Vec::with_capacity(CURSOR_REPORT_MAX);
    while reply.len() < CURSOR_REPORT_MAX {
        match input.next_byte()? {
            Some(b'R') => {
                reply.push(b'R');
                break;
            }
            Some(byte) => reply.push(byte),
            None => break,
        }
    }
    parse_cursor_report(&reply)
}

/// カーソル位置レポートを解析する
pub fn parse_cursor_report(reply: &[u8]) -> Result<ScreenSize> {
    let malformed = |bytes: &[u8]| Error::CursorReport(String::from_utf8_lossy(bytes).into_owned());

    let body = match reply {
        [ESC, b'[', body @ ..] => body,
        _ => return Err(malformed(reply)),
    };
    let body = body.strip_suffix(b"R").ok_or_else(|| malformed(reply))?;
    let semi = body
        .iter()
        .position(|&b| b == b';')
        .ok_or_else(|| malformed(reply))?;

    let field = |bytes: &[u8]| -> Result<u16> {
        std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .filter(|&n| n > 0)
            .ok_or_else(|| malformed(bytes))
    };

    let rows = field(&body[..semi])?;
    let cols = field(&body[semi + 1..])?;
    Ok(ScreenSize { rows, cols })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_parse_cursor_report() {
        let size = parse_cursor_report(b"\x1b[24;80R").unwrap();
        assert_eq!(size, ScreenSize { rows: 24, cols: 80 });
    }

    #[test]
    fn test_parse_cursor_report_reports_bad_field() {
        match parse_cursor_report(b"\x1b[2x;80R") {
            Err(Error::CursorReport(s)) => assert_eq!(s, "2x"),
            other => panic!("unexpected: {other:?}"),
        }
        match parse_cursor_report(b"\x1b[24;R") {
            Err(Error::CursorReport(s)) => assert_eq!(s, ""),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parse_cursor_report_rejects_malformed() {
        assert!(parse_cursor_report(b"").is_err());
        assert!(parse_cursor_report(b"24;80R").is_err());
        assert!(parse_cursor_report(b"\x1b[2480R").is_err());
        assert!(parse_cursor_report(b"\x1b[24;80").is_err());
        assert!(parse_cursor_report(b"\x1b[0;80R").is_err());
    }

    #[test]
    fn test_clear_screen() {
        let mut output = Vec::new();

        clear_screen(&mut output).unwrap();

        assert_eq!(output, b"\x1b[2J\x1b[1;1H");
    }

    #[test]
    fn test_clear_screen_reports_write_error() {
        struct Closed;

        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::BrokenPipe.into())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = clear_screen(&mut Closed).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_probe_size() {
        let mut input: &[u8] = b"\x1b[50;132R";
        let mut output = Vec::new();

        let size = probe_size(&mut input, &mut output).unwrap();

        assert_eq!(size, ScreenSize { rows: 50, cols: 132 });
        assert_eq!(output, b"\x1b[999C\x1b[999B\x1b[6n");
    }

    #[test]
    fn test_cursor_position_stops_at_r() {
        let mut input: &[u8] = b"\x1b[3;4Rrest";
        let mut output = Vec::new();

        let size = cursor_position(&mut input, &mut output).unwrap();

        assert_eq!(size, ScreenSize { rows: 3, cols: 4 });
        assert_eq!(input, b"rest");
    }

    #[test]
    fn test_cursor_position_is_bounded() {
        let long = [b'9'; 64];
        let mut input: &[u8] = &long;
        let mut output = Vec::new();

        assert!(cursor_position(&mut input, &mut output).is_err());
        // 最大長までしか読まない
        assert_eq!(input.len(), 64 - CURSOR_REPORT_MAX);
    }

    #[test]
    fn test_raw_attributes() {
        // SAFETY: テスト用のゼロ初期化
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        original.c_lflag = libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN | libc::ECHOE;
        original.c_iflag = libc::ICRNL | libc::IXON | libc::BRKINT | libc::INPCK | libc::ISTRIP;
        original.c_oflag = libc::OPOST;

        let raw = raw_attributes(&original);

        assert_eq!(raw.c_lflag, libc::ECHOE);
        assert_eq!(raw.c_iflag, 0);
        assert_eq!(raw.c_oflag, 0);
        assert_eq!(raw.c_cflag & libc::CS8, libc::CS8);
        assert_eq!(raw.c_cc[libc::VMIN], 0);
        assert_eq!(raw.c_cc[libc::VTIME], 1);
    }

    fn open_pty() -> (RawFd, RawFd) {
        let mut master = 0;
        let mut slave = 0;
        let rc = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        assert_eq!(rc, 0, "openpty failed");
        (master, slave)
    }

    fn attributes(fd: RawFd) -> libc::termios {
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        assert_eq!(unsafe { libc::tcgetattr(fd, &mut termios) }, 0);
        termios
    }

    fn assert_same_mode(a: &libc::termios, b: &libc::termios) {
        assert_eq!(a.c_iflag, b.c_iflag);
        assert_eq!(a.c_oflag, b.c_oflag);
        assert_eq!(a.c_cflag, b.c_cflag);
        assert_eq!(a.c_lflag, b.c_lflag);
        assert_eq!(a.c_cc, b.c_cc);
    }

    fn close(fds: (RawFd, RawFd)) {
        unsafe {
            libc::close(fds.0);
            libc::close(fds.1);
        }
    }

    #[test]
    fn test_raw_mode_is_restored_on_drop() {
        let fds = open_pty();
        let original = attributes(fds.1);

        {
            let _raw = RawMode::enable(fds.1).unwrap();
            let raw = attributes(fds.1);
            assert_eq!(raw.c_lflag & (libc::ICANON | libc::ECHO | libc::ISIG), 0);
            assert_eq!(raw.c_cc[libc::VMIN], 0);
            assert_eq!(raw.c_cc[libc::VTIME], READ_TIMEOUT_DECISECONDS);
        }

        assert_same_mode(&attributes(fds.1), &original);
        close(fds);
    }

    #[test]
    fn test_open_error_restores_mode() {
        use crate::buffer::Buffer;
        use crate::file_io::FileIO;

        fn open_in_raw_mode(fd: RawFd, path: &std::path::Path) -> Result<Buffer> {
            let _raw = RawMode::enable(fd)?;
            FileIO::open(path)
        }

        let fds = open_pty();
        let original = attributes(fds.1);
        let dir = tempfile::tempdir().unwrap();

        let result = open_in_raw_mode(fds.1, &dir.path().join("missing"));

        assert!(matches!(result, Err(Error::Open { .. })));
        assert_same_mode(&attributes(fds.1), &original);
        close(fds);
    }

    #[test]
    fn test_not_a_terminal() {
        let file = tempfile::tempfile().unwrap();
        let fd = std::os::unix::io::AsRawFd::as_raw_fd(&file);

        assert!(matches!(RawMode::enable(fd), Err(Error::NotATerminal)));
    }
}
