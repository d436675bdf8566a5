//! Case-insensitive text scanning used by the parser and the hint engine.

/// Compare two strings ignoring case (Unicode lowercase mapping).
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// True when `haystack` contains every word as a case-insensitive substring.
/// An empty word list matches everything.
pub fn contains_all_words(haystack: &str, words: &[&str]) -> bool {
    let haystack = haystack.to_lowercase();
    words
        .iter()
        .all(|w| haystack.contains(&w.to_lowercase()))
}

pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// If `text` starts with `prefix` (ignoring case), return what follows it.
pub fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = text.char_indices();
    let mut end = 0;
    for p in prefix.chars() {
        let (i, t) = chars.next()?;
        if !p.to_lowercase().eq(t.to_lowercase()) {
            return None;
        }
        end = i + t.len_utf8();
    }
    text.get(end..)
}

/// A token ends at the end of input or at whitespace.
pub fn at_boundary(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(char::is_whitespace)
}

/// Forward-only cursor over the text that follows a matched command name.
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn rewind(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Text consumed since `mark`, a position taken earlier.
    pub fn consumed_since(&self, mark: usize) -> &'a str {
        self.text.get(mark..self.pos).unwrap_or("")
    }

    pub fn rest(&self) -> &'a str {
        self.text.get(self.pos..).unwrap_or("")
    }

    pub fn is_at_end(&self) -> bool {
        self.rest().trim_start().is_empty()
    }

    /// Whether the last consumed token was terminated by whitespace.
    pub fn followed_by_whitespace(&self) -> bool {
        self.rest().starts_with(char::is_whitespace)
    }

    pub fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Consume `name` if the remaining text starts with it (ignoring case)
    /// and the match ends on a token boundary.
    pub fn eat_ignore_case(&mut self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        match strip_prefix_ignore_case(self.rest(), name) {
            Some(after) if at_boundary(after) => {
                self.pos = self.text.len() - after.len();
                true
            }
            _ => false,
        }
    }

    /// Consume exactly `count` whitespace-separated words. Returns the words
    /// joined by single spaces, or `None` (consuming nothing) when fewer remain.
    pub fn take_words(&mut self, count: usize) -> Option<String> {
        let start = self.pos;
        let mut taken: Vec<&str> = Vec::with_capacity(count);
        for _ in 0..count {
            self.skip_whitespace();
            let rest = self.rest();
            let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
            if len == 0 {
                self.pos = start;
                return None;
            }
            taken.push(rest.get(..len).unwrap_or(""));
            self.pos += len;
        }
        Some(taken.join(" "))
    }

    /// Consume everything that remains, trimmed of surrounding whitespace.
    /// The cursor stays before any trailing whitespace so the caller can
    /// still see whether the token was terminated.
    pub fn take_rest(&mut self) -> &'a str {
        self.skip_whitespace();
        let rest = self.rest();
        let trimmed = rest.trim_end();
        self.pos += trimmed.len();
        trimmed
    }
}
