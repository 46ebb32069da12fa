use crate::error::ScriptWarning;
use crate::lexer::Lexer;
use crate::token::{Kind, Token};
use serde::Serialize;

/// Number of argument slots scripts were originally limited to. Longer lines
/// are kept whole but reported.
pub const LEGACY_SLOT_LIMIT: usize = 7;

/// One assembled script line: the command name followed by its positional
/// arguments, in source order.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct CommandRecord {
    line: usize,
    slots: Vec<String>,
}

impl CommandRecord {
    pub fn new(line: usize, slots: Vec<String>) -> Self {
        Self { line, slots }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn name(&self) -> Option<&str> {
        self.arg(0)
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(String::as_str)
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.slots.iter().any(|slot| slot == marker)
    }

    /// Arguments after the command name with every `marker` removed.
    pub fn args_without(&self, markers: &[&str]) -> Vec<&str> {
        self.slots
            .iter()
            .skip(1)
            .map(String::as_str)
            .filter(|slot| !markers.contains(slot))
            .collect()
    }
}

/// Pulls tokens from a lexer one line at a time.
pub struct Parser<'a> {
    lexer: &'a mut Lexer,
    warnings: Vec<ScriptWarning>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: &'a mut Lexer) -> Self {
        Self {
            lexer,
            warnings: Vec::new(),
        }
    }

    pub fn take_warnings(&mut self) -> Vec<ScriptWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Assembles the next line. Returns `None` only when the input is
    /// exhausted; a blank line gives an empty record.
    pub fn next_line(&mut self) -> Option<CommandRecord> {
        let mut token = self.lexer.next_token();
        if token.kind == Kind::Eof {
            return None;
        }

        let line = token.location.line;
        let mut slots: Vec<String> = Vec::new();
        let mut inside_quotes = false;
        let mut quoted = String::new();

        loop {
            match token.kind {
                Kind::NewLine | Kind::Eof => break,
                Kind::Quote => {
                    inside_quotes = !inside_quotes;
                    if !inside_quotes {
                        slots.push(std::mem::take(&mut quoted));
                    }
                }
                Kind::Whitespace => {
                    if inside_quotes {
                        quoted.push_str(&token.lexeme);
                    }
                }
                Kind::LexError => self.lex_error(&token),
                Kind::Keyword if slots.is_empty() && !inside_quotes => {
                    let is_label = token.lexeme == "label";
                    slots.push(token.lexeme);
                    if is_label {
                        // A label always targets the line right after it.
                        slots.push((line + 1).to_string());
                    }
                }
                Kind::Keyword | Kind::Word | Kind::Number | Kind::Punctuation => {
                    if inside_quotes {
                        quoted.push_str(&token.lexeme);
                    } else {
                        slots.push(token.lexeme);
                    }
                }
            }
            token = self.lexer.next_token();
        }

        // An unterminated quote was already reported by the lexer; keep what
        // was collected so the line is still usable.
        if inside_quotes {
            slots.push(quoted);
        }

        if slots.len() > LEGACY_SLOT_LIMIT {
            let warning = ScriptWarning::SlotOverflow {
                line,
                count: slots.len(),
                limit: LEGACY_SLOT_LIMIT,
            };
            tracing::warn!("{}", warning);
            self.warnings.push(warning);
        }

        Some(CommandRecord::new(line, slots))
    }

    fn lex_error(&mut self, token: &Token) {
        let warning = ScriptWarning::Lex {
            location: token.location,
            lexeme: token.lexeme.clone(),
        };
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

impl Iterator for Parser<'_> {
    type Item = CommandRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}

/// Assembles every line of `source`.
pub fn parse(source: &str) -> (Vec<CommandRecord>, Vec<ScriptWarning>) {
    let mut lexer = Lexer::new(source);
    let mut parser = Parser::new(&mut lexer);
    let records: Vec<CommandRecord> = parser.by_ref().collect();
    (records, parser.take_warnings())
}
