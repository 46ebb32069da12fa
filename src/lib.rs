//! Interpreter for a line-oriented visual novel scripting language.
//!
//! A script is read once to register labels, assets and variables, then
//! played one suspension at a time: callers feed [`Signal`]s in and render
//! the [`Directive`]s that come back.

pub mod assets;
pub mod config;
pub mod directive;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod script;
pub mod setup;
pub mod store;
pub mod token;
pub mod types;

pub use directive::{Directive, Signal};
pub use error::{RuntimeError, ScriptError, ScriptWarning};
pub use interpreter::{Interpreter, InterpreterOptions, State};
