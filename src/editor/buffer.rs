use ropey::Rope;

/// Cursor position in the article buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, counted in characters.
    pub col: usize,
    /// Column to return to when moving vertically through shorter lines.
    goal_col: usize,
}

impl Cursor {
    /// A cursor at the start of the buffer.
    pub const fn new() -> Self {
        Self::at(0, 0)
    }

    /// A cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            goal_col: col,
        }
    }

    const fn place(&mut self, col: usize) {
        self.col = col;
        self.goal_col = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Markdown source of the article being edited.
///
/// Columns are character based so multi-byte text never splits a code point.
/// The buffer tracks whether it changed since it was last loaded, which the
/// session compares against the last content the backend acknowledged.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    modified: bool,
}

impl EditorBuffer {
    /// Create a buffer holding `text` with the cursor at the start.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            modified: false,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Replace the whole content and move the cursor back to the start.
    pub fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.cursor = Cursor::new();
        self.modified = false;
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether an edit happened since the buffer was filled.
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Whether the buffer holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.rope.chars().all(char::is_whitespace)
    }

    /// Content of a line without its line terminator.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(line_idx).to_string();
        Some(line.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Length of a line in characters, without its terminator.
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.chars().count())
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn insert_char(&mut self, ch: char) {
        let idx = self.cursor_char_idx();
        self.rope.insert_char(idx, ch);
        if ch == '\n' {
            self.cursor.line += 1;
            self.cursor.place(0);
        } else {
            self.cursor.place(self.cursor.col + 1);
        }
        self.modified = true;
    }

    /// Insert a (possibly multi-line) string, leaving the cursor after it.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let normalized = s.replace("\r\n", "\n");
        let idx = self.cursor_char_idx();
        self.rope.insert(idx, &normalized);

        let mut pieces = normalized.split('\n');
        let first = pieces.next().unwrap_or_default();
        let rest: Vec<&str> = pieces.collect();
        match rest.last() {
            Some(last) => {
                self.cursor.line += rest.len();
                self.cursor.place(last.chars().count());
            }
            None => self.cursor.place(self.cursor.col + first.chars().count()),
        }
        self.modified = true;
    }

    /// Break the line at the cursor (Enter).
    pub fn split_line(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the character before the cursor (Backspace).
    ///
    /// Returns `true` if anything was removed.
    pub fn delete_back(&mut self) -> bool {
        if self.cursor.col == 0 && self.cursor.line == 0 {
            return false;
        }
        let idx = self.cursor_char_idx();
        if self.cursor.col == 0 {
            let joined_col = self.line_len(self.cursor.line - 1);
            self.rope.remove(idx - 1..idx);
            self.cursor.line -= 1;
            self.cursor.place(joined_col);
        } else {
            self.rope.remove(idx - 1..idx);
            self.cursor.place(self.cursor.col - 1);
        }
        self.modified = true;
        true
    }

    /// Delete the character under the cursor (Delete).
    ///
    /// Returns `true` if anything was removed.
    pub fn delete_forward(&mut self) -> bool {
        let idx = self.cursor_char_idx();
        if idx >= self.rope.len_chars() {
            return false;
        }
        self.rope.remove(idx..=idx);
        self.modified = true;
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                if self.cursor.col > 0 {
                    self.cursor.place(self.cursor.col - 1);
                } else if self.cursor.line > 0 {
                    self.cursor.line -= 1;
                    self.cursor.place(self.line_len(self.cursor.line));
                }
            }
            Direction::Right => {
                if self.cursor.col < self.line_len(self.cursor.line) {
                    self.cursor.place(self.cursor.col + 1);
                } else if self.cursor.line + 1 < self.line_count() {
                    self.cursor.line += 1;
                    self.cursor.place(0);
                }
            }
            Direction::Up => {
                if self.cursor.line > 0 {
                    self.cursor.line -= 1;
                    self.cursor.col = self.cursor.goal_col.min(self.line_len(self.cursor.line));
                }
            }
            Direction::Down => {
                if self.cursor.line + 1 < self.line_count() {
                    self.cursor.line += 1;
                    self.cursor.col = self.cursor.goal_col.min(self.line_len(self.cursor.line));
                }
            }
        }
    }

    /// Home.
    pub const fn move_home(&mut self) {
        self.cursor.place(0);
    }

    /// End.
    pub fn move_end(&mut self) {
        self.cursor.place(self.line_len(self.cursor.line));
    }

    /// Ctrl+Left: jump to the start of the previous word.
    pub fn move_word_left(&mut self) {
        if self.cursor.col == 0 {
            self.move_cursor(Direction::Left);
            return;
        }
        let chars: Vec<char> = self
            .line_at(self.cursor.line)
            .unwrap_or_default()
            .chars()
            .collect();
        let mut col = self.cursor.col.min(chars.len());
        while col > 0 && !is_word_char(chars[col - 1]) {
            col -= 1;
        }
        while col > 0 && is_word_char(chars[col - 1]) {
            col -= 1;
        }
        self.cursor.place(col);
    }

    /// Ctrl+Right: jump past the current word and the gap after it.
    pub fn move_word_right(&mut self) {
        let chars: Vec<char> = self
            .line_at(self.cursor.line)
            .unwrap_or_default()
            .chars()
            .collect();
        if self.cursor.col >= chars.len() {
            self.move_cursor(Direction::Right);
            return;
        }
        let mut col = self.cursor.col;
        while col < chars.len() && is_word_char(chars[col]) {
            col += 1;
        }
        while col < chars.len() && !is_word_char(chars[col]) {
            col += 1;
        }
        self.cursor.place(col);
    }

    /// Place the cursor at `(line, col)`, clamped to the buffer.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.cursor.line = line.min(self.line_count().saturating_sub(1));
        self.cursor.place(col.min(self.line_len(self.cursor.line)));
    }

    /// Ctrl+Home.
    pub const fn move_to_start(&mut self) {
        self.cursor = Cursor::new();
    }

    /// Ctrl+End.
    pub fn move_to_end(&mut self) {
        let last = self.line_count().saturating_sub(1);
        self.cursor.line = last;
        self.cursor.place(self.line_len(last));
    }

    fn cursor_char_idx(&self) -> usize {
        self.rope.line_to_char(self.cursor.line) + self.cursor.col.min(self.line_len(self.cursor.line))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field("rope", &format_args!("Rope({} lines)", self.rope.len_lines()))
            .field("cursor", &self.cursor)
            .field("modified", &self.modified)
            .finish()
    }
}
