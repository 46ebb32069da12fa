use serde::Serialize;
use std::fmt;

/// Position of a token in the script. Lines are 0-based so they can be used
/// directly as jump targets, columns are 1-based.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Token {
    pub(crate) kind: Kind,
    pub(crate) lexeme: String,
    pub(crate) location: Location,
}

impl Token {
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn location(&self) -> Location {
        self.location
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum Kind {
    Keyword,     // label, jump, show, ...
    Word,        // names, paths, text inside quotes
    Number,      // 12, -5, 0.75
    Quote,       // "
    Punctuation, // single special character
    Whitespace,  // run of blanks
    NewLine,
    Eof,
    LexError,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
