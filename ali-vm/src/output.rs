//! Buffered output with whitespace filtering and line wrapping.
//!
//! Built-ins append raw text; when the buffer is flushed it is
//! post-processed in two passes. The whitespace filter strips leading and
//! trailing newlines, collapses runs of more than two newlines to exactly
//! two, allows a space only after a non-space character, and drops tabs.
//! The line-wrap pass breaks each line at the last space that keeps it
//! within the visible width, where the formatting markers `*` (bold
//! toggle) and `~` (typographic double quote) occupy no columns.

/// Output accumulated by the built-ins between flushes.
#[derive(Debug, Default, Clone)]
pub struct OutputBuffer {
    buf: String,
}

impl OutputBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been written since the last clear.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append a single character.
    pub fn push_char(&mut self, ch: char) {
        self.buf.push(ch);
    }

    /// Append a string.
    pub fn push_str(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// The raw, unfiltered contents.
    pub fn raw(&self) -> &str {
        &self.buf
    }

    /// Discard the contents.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Filter the contents and clear the buffer. Wrapping is applied iff
    /// a line width is given.
    pub fn take_filtered(&mut self, line_width: Option<usize>) -> String {
        let mut text = filter_whitespace(&self.buf);
        self.buf.clear();
        if let Some(width) = line_width {
            text = line_wrap(&text, width);
        }
        text
    }
}

/// The whitespace-filter pass.
fn filter_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    // Both counters start saturated so leading whitespace is dropped.
    let mut num_newlines = 2usize;
    let mut num_spaces = 2usize;
    for ch in input.chars() {
        match ch {
            '\n' => {
                if num_newlines < 2 {
                    out.push('\n');
                    num_newlines += 1;
                    num_spaces += 1;
                }
            }
            ' ' | '\t' => {
                if ch == ' ' && num_spaces == 0 {
                    out.push(' ');
                    num_spaces += 1;
                }
            }
            _ => {
                out.push(ch);
                num_newlines = 0;
                num_spaces = 0;
            }
        }
    }
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

/// The line-wrap pass: ensure no line exceeds `width` visible columns by
/// turning the last fitting space of an overlong line into a newline.
/// The markers `*` and `~` are invisible and never counted.
fn line_wrap(input: &str, width: usize) -> String {
    let mut chars: Vec<char> = input.chars().collect();
    let mut last_space: Option<usize> = None;
    let mut column = 0usize;
    for i in 0..chars.len() {
        match chars[i] {
            '\n' => {
                last_space = None;
                column = 0;
            }
            ' ' => {
                last_space = Some(i);
                column += 1;
            }
            '*' | '~' => {}
            _ => {
                column += 1;
                if column > width {
                    if let Some(space) = last_space {
                        chars[space] = '\n';
                        column = chars[space + 1..=i]
                            .iter()
                            .filter(|&&c| c != '*' && c != '~')
                            .count();
                        last_space = None;
                    }
                }
            }
        }
    }
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtered(input: &str) -> String {
        let mut buf = OutputBuffer::new();
        buf.push_str(input);
        buf.take_filtered(None)
    }

    fn wrapped(input: &str, width: usize) -> String {
        let mut buf = OutputBuffer::new();
        buf.push_str(input);
        buf.take_filtered(Some(width))
    }

    #[test]
    fn leading_and_trailing_newlines_are_stripped() {
        assert_eq!(filtered("\n\nHello\n\n\n"), "Hello");
        assert_eq!(filtered("Hello"), "Hello");
        assert_eq!(filtered(""), "");
        assert_eq!(filtered("\n\n\n"), "");
    }

    #[test]
    fn newline_runs_collapse_to_two() {
        assert_eq!(filtered("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(filtered("a\nb"), "a\nb");
        assert_eq!(filtered("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn spaces_only_follow_nonspace() {
        assert_eq!(filtered("  a  b "), "a b");
        assert_eq!(filtered(" word"), "word");
        assert_eq!(filtered("a\n b"), "a\nb");
        // A space before a newline is untouched; only what may precede a
        // space is constrained.
        assert_eq!(filtered("a \nb"), "a \nb");
    }

    #[test]
    fn tabs_are_dropped() {
        assert_eq!(filtered("a\tb"), "ab");
        assert_eq!(filtered("\t\ta"), "a");
    }

    #[test]
    fn buffer_is_cleared_by_take() {
        let mut buf = OutputBuffer::new();
        buf.push_str("once");
        assert_eq!(buf.take_filtered(None), "once");
        assert_eq!(buf.take_filtered(None), "");
    }

    #[test]
    fn wrap_breaks_at_last_space() {
        assert_eq!(wrapped("aaa bbb ccc", 7), "aaa bbb\nccc");
        assert_eq!(wrapped("aaa bbb ccc", 11), "aaa bbb ccc");
        assert_eq!(wrapped("aaa bbb ccc", 5), "aaa\nbbb\nccc");
    }

    #[test]
    fn wrap_without_space_leaves_line_alone() {
        assert_eq!(wrapped("abcdefghij", 4), "abcdefghij");
    }

    #[test]
    fn wrap_ignores_formatting_markers() {
        // Nine visible columns despite the markers.
        assert_eq!(wrapped("*aaa* ~bb~ cc", 10), "*aaa* ~bb~ cc");
        assert_eq!(wrapped("*aaa* ~bb~ cc", 8), "*aaa* ~bb~\ncc");
        assert_eq!(wrapped("*aaa* ~bb~ cc", 4), "*aaa*\n~bb~\ncc");
    }

    #[test]
    fn wrap_resets_after_existing_newlines() {
        assert_eq!(wrapped("aaaa\nbbbb cccc", 9), "aaaa\nbbbb cccc");
        assert_eq!(wrapped("aaaa\nbbbb ccccc", 9), "aaaa\nbbbb\nccccc");
    }
}
