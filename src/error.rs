use crate::token::Location;
use std::path::Path;
use thiserror::Error;

/// Fatal for the binary: the script could not be loaded or run.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("FileNotFoundError: {0}")]
    FileNotFound(String),

    #[error("IOError: {0}")]
    Io(#[from] std::io::Error),

    #[error("JsonError: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScriptError {
    pub fn missing_file(path: &Path) -> Self {
        ScriptError::FileNotFound(format!("{}", path.display()))
    }
}

/// Errors that stop a dispatch cycle. The interpreter stays usable after
/// reporting one of these.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum RuntimeError {
    #[error("unknown label `{label}` on line {}", .line + 1)]
    UnknownLabel { label: String, line: usize },

    #[error("unknown choice `{name}` on line {}", .line + 1)]
    UnknownChoice { name: String, line: usize },

    #[error("execution exceeded maximum dispatch count ({limit})")]
    StepLimitExceeded { limit: usize },
}

/// Failures of a single variable operation.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum VariableError {
    #[error("unknown variable `{0}`")]
    Unknown(String),

    #[error("variable `{name}` is not {expected}")]
    KindMismatch { name: String, expected: &'static str },

    #[error("integer overflow in `{0}`")]
    Overflow(String),
}

/// Non-fatal problems found while reading or running a script. The offending
/// line is skipped (or partially applied) and execution carries on.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ScriptWarning {
    #[error("line {}: unexpected {lexeme:?} at column {}", .location.line + 1, .location.column)]
    Lex { location: Location, lexeme: String },

    #[error("line {}: {count} values exceed the {limit} argument slots", .line + 1)]
    SlotOverflow {
        line: usize,
        count: usize,
        limit: usize,
    },

    #[error("line {}: `{command}` is missing its {argument}", .line + 1)]
    MissingArgument {
        line: usize,
        command: String,
        argument: &'static str,
    },

    #[error("line {}: invalid integer literal {value:?}", .line + 1)]
    MalformedInteger { line: usize, value: String },

    #[error("line {}: invalid boolean literal {value:?}", .line + 1)]
    MalformedBoolean { line: usize, value: String },

    #[error("line {}: invalid number {value:?}", .line + 1)]
    MalformedNumber { line: usize, value: String },

    #[error("line {}: unknown comparison operator {operator:?}", .line + 1)]
    UnknownOperator { line: usize, operator: String },

    #[error("line {}: {source}", .line + 1)]
    Variable {
        line: usize,
        #[source]
        source: VariableError,
    },

    #[error("line {}: {what} `{name}` is already declared", .line + 1)]
    Redeclared {
        line: usize,
        what: &'static str,
        name: String,
    },

    #[error("line {}: unknown {what} `{name}`", .line + 1)]
    UnknownAsset {
        line: usize,
        what: &'static str,
        name: String,
    },

    #[error("line {}: unknown choice `{name}`", .line + 1)]
    UnknownChoice { line: usize, name: String },
}

impl ScriptWarning {
    /// Line the warning refers to.
    pub fn line(&self) -> usize {
        match self {
            ScriptWarning::Lex { location, .. } => location.line,
            ScriptWarning::SlotOverflow { line, .. }
            | ScriptWarning::MissingArgument { line, .. }
            | ScriptWarning::MalformedInteger { line, .. }
            | ScriptWarning::MalformedBoolean { line, .. }
            | ScriptWarning::MalformedNumber { line, .. }
            | ScriptWarning::UnknownOperator { line, .. }
            | ScriptWarning::Variable { line, .. }
            | ScriptWarning::Redeclared { line, .. }
            | ScriptWarning::UnknownAsset { line, .. }
            | ScriptWarning::UnknownChoice { line, .. } => *line,
        }
    }
}
