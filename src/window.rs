use std::collections::VecDeque;
use std::io::{self, BufRead};

/// A bounded buffer that keeps the most recent N lines of a file
///
/// Lines are stored oldest-first. Pushing past the capacity drops the
/// oldest line, so after reading a whole file the window holds exactly
/// `min(capacity, total lines)` lines.
#[derive(Debug)]
pub struct LineWindow {
    /// Lines stored in the window (newest at back)
    lines: VecDeque<String>,

    /// Maximum number of lines to keep
    capacity: usize,
}

impl LineWindow {
    /// Create a new window with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1000)), // Start smaller, grow as needed
            capacity: capacity.max(1), // Minimum capacity of 1
        }
    }

    /// Push a new line onto the back of the window
    ///
    /// Returns the evicted line if the window was already full.
    pub fn push(&mut self, line: String) -> Option<String> {
        self.lines.push_back(line);

        if self.lines.len() > self.capacity {
            return self.lines.pop_front();
        }

        None
    }

    /// Replace the window contents with the tail of `reader`
    ///
    /// Reads from the current position to end-of-stream. Both `\n` and
    /// `\r\n` terminators are stripped, a final unterminated line still
    /// counts, and invalid UTF-8 is decoded lossily. Returns the total
    /// number of lines read, which may exceed the window capacity.
    pub fn refill<R: BufRead>(&mut self, mut reader: R) -> io::Result<usize> {
        self.lines.clear();

        let mut buf = Vec::new();
        let mut total = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }

            self.push(String::from_utf8_lossy(&buf).into_owned());
            total += 1;
        }

        Ok(total)
    }

    /// Render the window as one string, oldest line first, each line
    /// followed by a `\n`
    pub fn render(&self) -> String {
        let size: usize = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut out = String::with_capacity(size);
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Get the number of lines currently in the window
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the window is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the window's capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over the retained lines, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_new_window() {
        let window = LineWindow::new(100);
        assert_eq!(window.capacity(), 100);
        assert_eq!(window.len(), 0);
        assert!(window.is_empty());
    }

    #[test]
    fn test_minimum_capacity() {
        let window = LineWindow::new(0);
        assert_eq!(window.capacity(), 1);
    }

    #[test]
    fn test_push_with_eviction() {
        let mut window = LineWindow::new(3);

        assert!(window.push("line 0".to_string()).is_none());
        assert!(window.push("line 1".to_string()).is_none());
        assert!(window.push("line 2".to_string()).is_none());

        // This push should evict line 0
        let evicted = window.push("line 3".to_string());
        assert_eq!(evicted.as_deref(), Some("line 0"));

        let items: Vec<_> = window.iter().collect();
        assert_eq!(items, vec!["line 1", "line 2", "line 3"]);
    }

    #[test]
    fn test_refill_keeps_last_lines() {
        let mut window = LineWindow::new(3);
        let total = window.refill(Cursor::new("a\nb\nc\nd\ne\n")).unwrap();

        assert_eq!(total, 5);
        assert_eq!(window.len(), 3);
        assert_eq!(window.render(), "c\nd\ne\n");
    }

    #[test]
    fn test_refill_shorter_than_capacity() {
        let mut window = LineWindow::new(10);
        window.refill(Cursor::new("one\ntwo\n")).unwrap();

        assert_eq!(window.len(), 2);
        assert_eq!(window.render(), "one\ntwo\n");
    }

    #[test]
    fn test_refill_replaces_previous_contents() {
        let mut window = LineWindow::new(5);
        window.refill(Cursor::new("old 1\nold 2\nold 3\n")).unwrap();
        window.refill(Cursor::new("new\n")).unwrap();

        let items: Vec<_> = window.iter().collect();
        assert_eq!(items, vec!["new"]);
    }

    #[test]
    fn test_refill_no_trailing_newline() {
        let mut window = LineWindow::new(5);
        let total = window.refill(Cursor::new("Line 1\nLine 2")).unwrap();

        assert_eq!(total, 2);
        assert_eq!(window.render(), "Line 1\nLine 2\n");
    }

    #[test]
    fn test_refill_strips_crlf() {
        let mut window = LineWindow::new(5);
        window.refill(Cursor::new("first\r\nsecond\r\n")).unwrap();

        let items: Vec<_> = window.iter().collect();
        assert_eq!(items, vec!["first", "second"]);
    }

    #[test]
    fn test_refill_keeps_blank_lines() {
        let mut window = LineWindow::new(5);
        window.refill(Cursor::new("a\n\nb\n")).unwrap();

        assert_eq!(window.len(), 3);
        assert_eq!(window.render(), "a\n\nb\n");
    }

    #[test]
    fn test_refill_invalid_utf8_is_lossy() {
        let mut window = LineWindow::new(5);
        window
            .refill(Cursor::new(b"ok\n\xff\xfe bad\n".to_vec()))
            .unwrap();

        assert_eq!(window.len(), 2);
        assert!(window.render().starts_with("ok\n"));
        assert!(window.render().contains("bad"));
    }

    #[test]
    fn test_render_empty() {
        let mut window = LineWindow::new(5);
        window.refill(Cursor::new("")).unwrap();

        assert!(window.is_empty());
        assert_eq!(window.render(), "");
    }

    #[test]
    fn test_window_length_is_min_of_capacity_and_lines() {
        for capacity in 1..6 {
            for lines in 0..8 {
                let content: String = (0..lines).map(|i| format!("line {}\n", i)).collect();
                let mut window = LineWindow::new(capacity);
                window.refill(Cursor::new(content)).unwrap();
                assert_eq!(window.len(), capacity.min(lines));
            }
        }
    }
}
