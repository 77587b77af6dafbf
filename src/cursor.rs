use crate::terminal::ScreenSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// カーソル位置 (ファイル上の論理位置) と表示オフセット
#[derive(Debug, Default)]
pub struct Cursor {
    /// 行内の列 (0-based)
    column: usize,
    /// ファイル上の行 (0-based, 最終行の次まで有効)
    file_row: usize,
    /// 画面最上段に表示するファイル行
    row_offset: usize,
    /// 表示を開始する列
    col_offset: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn file_row(&self) -> usize {
        self.file_row
    }

    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    pub fn col_offset(&self) -> usize {
        self.col_offset
    }

    // 横スクロールを起こす操作はまだない
    pub fn set_col_offset(&mut self, col_offset: usize) {
        self.col_offset = col_offset;
    }

    /// 画面上の行 (0-based)
    pub fn screen_row(&self) -> usize {
        self.file_row.saturating_sub(self.row_offset)
    }

    /// カーソル行が画面内に収まるように row_offset を調整
    pub fn scroll(&mut self, screen_rows: usize) {
        if self.file_row < self.row_offset {
            self.row_offset = self.file_row;
        }
        if self.file_row >= self.row_offset + screen_rows {
            self.row_offset = self.file_row + 1 - screen_rows;
        }
    }

    pub fn move_up(&mut self) {
        if self.file_row > 0 {
            self.file_row -= 1;
        }
    }

    pub fn move_down(&mut self, line_count: usize) {
        if self.file_row < line_count {
            self.file_row += 1;
        }
    }

    pub fn move_left(&mut self) {
        if self.column > 0 {
            self.column -= 1;
        }
    }

    pub fn move_right(&mut self, max_cols: usize) {
        if self.column + 1 < max_cols {
            self.column += 1;
        }
    }

    /// 1 マス移動 (カーソルを動かす唯一の経路)
    pub fn step(&mut self, direction: Direction, size: ScreenSize, line_count: usize) {
        match direction {
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(line_count),
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(size.cols as usize),
        }
    }

    /// 画面の行数分だけ上下に移動する
    pub fn page(&mut self, direction: Direction, size: ScreenSize, line_count: usize) {
        for _ in 0..size.rows {
            self.step(direction, size, line_count);
        }
    }

    pub fn move_home(&mut self) {
        self.column = 0;
    }

    pub fn move_end(&mut self, max_cols: usize) {
        self.column = max_cols.saturating_sub(1);
    }
}
