use crate::token::{Kind, Location, Token};
use regex::Regex;
use std::rc::Rc;
use std::sync::OnceLock;

/// Reserved words. Anything else outside quotes is a plain word or number.
pub const KEYWORDS: [&str; 18] = [
    "label", "jump", "character", "image", "sound", "music", "int", "bool", "color", "if", "add",
    "subtract", "set", "show", "clear", "play", "stop", "choice",
];

const PUNCTUATION: &str = ",;:!?()[]{}<>=+*&%#@'`~^|";

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?$").expect("valid number pattern")
    })
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(c)
}

fn is_word_char(c: char) -> bool {
    !is_blank(c) && c != '"' && !is_punctuation(c) && !c.is_control()
}

/// Forward-only scanner over script text.
///
/// The lexer hands out one token per call and cannot be rewound; moving to a
/// different line means building a new lexer with [`Lexer::resume`]. Once the
/// end of input is reached every further call yields the same `Eof` token.
pub struct Lexer {
    chars: Rc<[char]>,
    current: usize,
    line: usize,
    column: usize,
    in_quotes: bool,
    quote_start: Location,
    done: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::resume(input.chars().collect(), 0, 0)
    }

    /// Starts scanning `chars` at char offset `offset`, which must be the
    /// first character of source line `line`.
    pub(crate) fn resume(chars: Rc<[char]>, offset: usize, line: usize) -> Self {
        Self {
            current: offset.min(chars.len()),
            chars,
            line,
            column: 1,
            in_quotes: false,
            quote_start: Location::default(),
            done: false,
        }
    }

    /// Line the next token will be read from.
    pub fn line(&self) -> usize {
        self.line
    }

    fn at(&self) -> char {
        if self.is_eof() {
            '\0'
        } else {
            self.chars[self.current]
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.at();
        self.current += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn is_eof(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    fn create_token(&self, kind: Kind, lexeme: String, location: Location) -> Token {
        Token {
            kind,
            lexeme,
            location,
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut run = String::new();
        while !self.is_eof() && predicate(self.at()) {
            run.push(self.advance());
        }
        run
    }

    pub fn next_token(&mut self) -> Token {
        let start = self.location();
        if self.done {
            return self.create_token(Kind::Eof, String::new(), start);
        }

        if self.is_eof() || self.at() == '\n' {
            // A line may not end inside a quoted string.
            if self.in_quotes {
                self.in_quotes = false;
                return self.create_token(Kind::LexError, "\"".to_string(), self.quote_start);
            }
            if self.is_eof() {
                self.done = true;
                return self.create_token(Kind::Eof, String::new(), start);
            }
            self.advance();
            return self.create_token(Kind::NewLine, "\n".to_string(), start);
        }

        match self.at() {
            '"' => {
                self.advance();
                if !self.in_quotes {
                    self.quote_start = start;
                }
                self.in_quotes = !self.in_quotes;
                self.create_token(Kind::Quote, "\"".to_string(), start)
            }
            c if is_blank(c) => {
                let run = self.take_while(is_blank);
                self.create_token(Kind::Whitespace, run, start)
            }
            _ if self.in_quotes => {
                let run = self.take_while(|c| c != '"' && c != '\n' && !is_blank(c));
                self.create_token(Kind::Word, run, start)
            }
            c if is_punctuation(c) => {
                self.advance();
                self.create_token(Kind::Punctuation, c.to_string(), start)
            }
            c if c.is_control() => {
                self.advance();
                self.create_token(Kind::LexError, c.to_string(), start)
            }
            _ => {
                let word = self.take_while(is_word_char);
                let kind = self.get_word_kind(&word);
                self.create_token(kind, word, start)
            }
        }
    }

    pub fn get_word_kind(&self, word: &str) -> Kind {
        if KEYWORDS.contains(&word) {
            Kind::Keyword
        } else if number_pattern().is_match(word) {
            Kind::Number
        } else {
            Kind::Word
        }
    }
}

/// Yields every token up to and including the first `Eof`.
impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        Some(self.next_token())
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}
