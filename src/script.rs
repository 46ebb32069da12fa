use crate::error::ScriptWarning;
use crate::lexer::Lexer;
use crate::parser::{CommandRecord, Parser};
use std::rc::Rc;

/// Source text plus the line reading continues from.
///
/// Reading moves forward one line at a time; [`Script::relocate`] throws the
/// lexer away and starts a fresh one at the requested line.
pub struct Script {
    chars: Rc<[char]>,
    line_offsets: Vec<usize>,
    lexer: Lexer,
}

impl Script {
    pub fn new(source: &str) -> Self {
        let chars: Rc<[char]> = source.chars().collect();
        let mut line_offsets = vec![0];
        line_offsets.extend(
            chars
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == '\n')
                .map(|(i, _)| i + 1),
        );
        let lexer = Lexer::resume(Rc::clone(&chars), 0, 0);
        Self {
            chars,
            line_offsets,
            lexer,
        }
    }

    /// Number of lines, counting a trailing empty line after the last newline.
    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }

    pub fn current_line(&self) -> usize {
        self.lexer.line()
    }

    /// Continues reading at `line`. Lines past the end leave the cursor at the
    /// end of input.
    pub fn relocate(&mut self, line: usize) {
        let offset = self
            .line_offsets
            .get(line)
            .copied()
            .unwrap_or(self.chars.len());
        self.lexer = Lexer::resume(Rc::clone(&self.chars), offset, line);
    }

    /// Assembles the line under the cursor and moves past it. `None` at the end
    /// of the script.
    pub fn next_record(&mut self, warnings: &mut Vec<ScriptWarning>) -> Option<CommandRecord> {
        let mut parser = Parser::new(&mut self.lexer);
        let record = parser.next_line();
        warnings.extend(parser.take_warnings());
        record
    }
}
