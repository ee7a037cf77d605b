//! Tokenizer for control directive lines.

/// Marker word that introduces a directive.
pub const KEYWORD: &str = "templatetest";

/// A lexical token of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// The `templatetest` marker
    Keyword,
    /// A `:` separator
    Colon,
    /// Text between separators, trimmed
    Text(&'a str),
}

/// Splits a line into [`Token`]s.
///
/// Text runs are cut at colons. A run ending in the directive keyword yields
/// the preceding text (if any) followed by [`Token::Keyword`], so a directive
/// may start anywhere in the line.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    rest: &'a str,
    pending_keyword: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            rest: line,
            pending_keyword: false,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.pending_keyword {
            self.pending_keyword = false;
            return Some(Token::Keyword);
        }

        loop {
            if self.rest.is_empty() {
                return None;
            }
            if let Some(after) = self.rest.strip_prefix(':') {
                self.rest = after;
                return Some(Token::Colon);
            }

            let end = self.rest.find(':').unwrap_or(self.rest.len());
            let (run, after) = self.rest.split_at(end);
            self.rest = after;

            let run = run.trim();
            if let Some(prefix) = run.strip_suffix(KEYWORD) {
                let prefix = prefix.trim_end();
                if prefix.is_empty() {
                    return Some(Token::Keyword);
                }
                self.pending_keyword = true;
                return Some(Token::Text(prefix));
            }
            if !run.is_empty() {
                return Some(Token::Text(run));
            }
        }
    }
}
