//! Document text as editable lines that rejoin to the original bytes

/// Lines of a document, each remembering whether it ended in `\r\n`
#[derive(Debug, Clone)]
pub(crate) struct DocumentLines {
    lines: Vec<String>,
    carriage_returns: Vec<bool>,
}

impl DocumentLines {
    pub fn new(text: &str) -> Self {
        let (lines, carriage_returns) = text
            .split('\n')
            .map(|line| match line.strip_suffix('\r') {
                Some(body) => (body.to_string(), true),
                None => (line.to_string(), false),
            })
            .unzip();

        Self {
            lines,
            carriage_returns,
        }
    }

    /// Lines `from..=to` (1-based) of one documented item
    pub fn item_mut(&mut self, from: usize, to: usize) -> Option<&mut [String]> {
        if from == 0 || from > to || to > self.content_len() {
            return None;
        }
        Some(&mut self.lines[from - 1..to])
    }

    /// Insert lines before the 0-based `index`, using the document's line ending
    pub fn insert(&mut self, index: usize, new_lines: Vec<String>) {
        let index = index.min(self.lines.len());
        let crlf = self.uses_crlf();
        let count = new_lines.len();

        self.lines.splice(index..index, new_lines);
        self.carriage_returns
            .splice(index..index, std::iter::repeat(crlf).take(count));
    }

    /// Index where content appended to the document goes
    ///
    /// A terminating newline leaves an empty final segment; appended lines
    /// go before it so the document keeps ending with a newline.
    pub fn end_index(&self) -> usize {
        self.content_len()
    }

    pub fn is_blank(&self, index: usize) -> bool {
        self.lines.get(index).map_or(true, |l| l.trim().is_empty())
    }

    pub fn join(&self) -> String {
        let mut out = String::new();
        for (i, (line, crlf)) in self.lines.iter().zip(&self.carriage_returns).enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line);
            if *crlf {
                out.push('\r');
            }
        }
        out
    }

    /// Number of lines, not counting the segment after a final newline
    fn content_len(&self) -> usize {
        match self.lines.last() {
            Some(last) if last.is_empty() && self.lines.len() > 1 => self.lines.len() - 1,
            _ => self.lines.len(),
        }
    }

    fn uses_crlf(&self) -> bool {
        self.carriage_returns.iter().any(|&crlf| crlf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_restores_text() {
        for text in ["a\nb\n", "a\r\nb\r\n", "a\nb", "", "\n", "a\r\n\r\nb"] {
            assert_eq!(DocumentLines::new(text).join(), text);
        }
    }

    #[test]
    fn test_insert_keeps_line_endings() {
        let mut lines = DocumentLines::new("a\r\nc\r\n");
        lines.insert(1, vec!["b".to_string()]);
        assert_eq!(lines.join(), "a\r\nb\r\nc\r\n");

        let mut lines = DocumentLines::new("a\n");
        let end = lines.end_index();
        lines.insert(end, vec![String::new(), "b".to_string()]);
        assert_eq!(lines.join(), "a\n\nb\n");
    }

    #[test]
    fn test_item_bounds() {
        let mut lines = DocumentLines::new("a\nb\n");
        assert_eq!(lines.item_mut(1, 2).map(|item| item.len()), Some(2));
        assert!(lines.item_mut(0, 1).is_none());
        assert!(lines.item_mut(2, 3).is_none());
    }
}
