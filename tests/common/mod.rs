#![allow(dead_code)]

use vnscript::{Directive, Interpreter, InterpreterOptions, State};

pub fn load(source: &str) -> Interpreter {
    Interpreter::load(source, InterpreterOptions::default())
}

/// Plays from the start, finishing every reveal and advancing past it, until
/// the script ends or asks for a choice.
pub fn play(interpreter: &mut Interpreter) -> Vec<Directive> {
    let mut directives = interpreter.start().expect("start");
    directives.extend(play_on(interpreter));
    directives
}

pub fn play_on(interpreter: &mut Interpreter) -> Vec<Directive> {
    let mut directives = Vec::new();
    for _ in 0..1000 {
        match interpreter.state() {
            State::Revealing => interpreter.skip(),
            State::AwaitingAdvance => directives.extend(interpreter.advance().expect("advance")),
            _ => break,
        }
    }
    directives
}

/// Text of every `ShowText` directive, in order.
pub fn texts(directives: &[Directive]) -> Vec<String> {
    directives
        .iter()
        .filter_map(|directive| match directive {
            Directive::ShowText { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}
