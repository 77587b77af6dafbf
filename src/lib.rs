pub mod buffer;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod file_io;
pub mod key;
pub mod logger;
pub mod screen;
pub mod terminal;

pub use error::{Error, Result};

// 製品情報 (ウェルカムバナー用)
pub const PRODUCT_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// raw mode の read タイムアウト (1/10 秒単位)
pub const READ_TIMEOUT_DECISECONDS: u8 = 1;

// カーソル位置レポートの最大長
pub const CURSOR_REPORT_MAX: usize = 32;

// 画面右下へ移動する際の移動量 (端末側でクランプされる)
pub const PROBE_DISTANCE: u16 = 999;

pub const ESC: u8 = 0x1b;

/// Ctrl と同時押しした時のバイト値
pub const fn ctrl_key(k: u8) -> u8 {
    k & 0x1f
}

pub const QUIT_KEY: u8 = ctrl_key(b'q');
