/// 1 行分のバイト列 (改行は含まない)
pub struct Row {
    chars: Vec<u8>,
}

impl Row {
    pub fn new(chars: Vec<u8>) -> Self {
        Self { chars }
    }

    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// 表示範囲 [col_offset, col_offset + width) を切り出す
    ///
    /// col_offset が行の長さを超える場合は空になる
    pub fn visible(&self, col_offset: usize, width: usize) -> &[u8] {
        if col_offset >= self.chars.len() {
            return &[];
        }
        let len = (self.chars.len() - col_offset).min(width);
        &self.chars[col_offset..col_offset + len]
    }
}

#[derive(Default)]
pub struct Buffer {
    rows: Vec<Row>,
}

impl Buffer {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// 末尾に行を追加
    pub fn append_row(&mut self, chars: Vec<u8>) {
        self.rows.push(Row::new(chars));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }
}
