use std::io::{self, Read};

use crate::ESC;

/// 論理キー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// そのままのバイト (印字可能文字 / 制御文字)
    Char(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Delete,
    PageUp,
    PageDown,
}

/// 1 バイトずつ読み出せる入力
///
/// `Ok(None)` は read タイムアウト (何も届かなかった) を表す。
pub trait ByteSource {
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<R: Read> ByteSource for R {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// エスケープシーケンス解析の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    SawEscape,
    SawBracket,
    SawBracketDigit(u8),
    SawO,
    /// ESC の後に `[` / `O` 以外が来た (もう 1 バイト読んでから捨てる)
    SawEscapeOther,
}

/// 状態遷移の結果
enum Step {
    Next(State),
    Emit(Key),
    /// 認識できないシーケンス (読み捨てる)
    Discard,
}

fn step(state: State, byte: u8) -> Step {
    match state {
        State::Idle if byte == ESC => Step::Next(State::SawEscape),
        State::Idle => Step::Emit(Key::Char(byte)),
        State::SawEscape => match byte {
            b'[' => Step::Next(State::SawBracket),
            b'O' => Step::Next(State::SawO),
            _ => Step::Next(State::SawEscapeOther),
        },
        State::SawBracket => match byte {
            b'0'..=b'9' => Step::Next(State::SawBracketDigit(byte)),
            b'A' => Step::Emit(Key::Up),
            b'B' => Step::Emit(Key::Down),
            b'C' => Step::Emit(Key::Right),
            b'D' => Step::Emit(Key::Left),
            b'H' => Step::Emit(Key::Home),
            b'F' => Step::Emit(Key::End),
            _ => Step::Discard,
        },
        State::SawBracketDigit(digit) if byte == b'~' => match digit {
            b'1' | b'7' => Step::Emit(Key::Home),
            b'3' => Step::Emit(Key::Delete),
            b'4' | b'8' => Step::Emit(Key::End),
            b'5' => Step::Emit(Key::PageUp),
            b'6' => Step::Emit(Key::PageDown),
            _ => Step::Discard,
        },
        State::SawBracketDigit(_) => Step::Discard,
        State::SawO => match byte {
            b'H' => Step::Emit(Key::Home),
            b'F' => Step::Emit(Key::End),
            _ => Step::Discard,
        },
        State::SawEscapeOther => Step::Discard,
    }
}

/// 1 回の呼び出しで論理キーを 1 つ読む
///
/// - 待機中のタイムアウトは `None` (何もしない)
/// - シーケンスの途中でタイムアウトした場合は ESC 単体
/// - 認識できないシーケンスは読み捨てて `None`
pub fn read_key<S: ByteSource + ?Sized>(input: &mut S) -> io::Result<Option<Key>> {
    let mut state = State::Idle;
    loop {
        let Some(byte) = input.next_byte()? else {
            // シーケンスの途中でタイムアウトした場合は ESC 単体
            return Ok(match state {
                State::Idle => None,
                _ => Some(Key::Char(ESC)),
            });
        };
        match step(state, byte) {
            Step::Next(next) => state = next,
            Step::Emit(key) => return Ok(Some(key)),
            Step::Discard => return Ok(None),
        }
    }
}
