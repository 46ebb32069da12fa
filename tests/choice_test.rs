mod common;
use common::*;
use vnscript::store::ChoiceOption;
use vnscript::{Directive, RuntimeError, State};

const PATHS: &str = "choice create path
choice path set text \"Which way?\"
choice path add \"Go left\" west
choice path add \"Go right\" east
choice path add \"Get lost\" nowhere
show choice path
label west
PC \"went left\"
jump end
label east
PC \"went right\"
label end
";

fn option(text: &str, destination: &str) -> ChoiceOption {
    ChoiceOption {
        text: text.to_string(),
        destination: destination.to_string(),
    }
}

#[test]
fn test_choice_is_presented() {
    let mut r = load(PATHS);
    let directives = play(&mut r);
    assert_eq!(
        directives,
        vec![Directive::PresentChoice {
            prompt: "Which way?".to_string(),
            options: vec![
                option("Go left", "west"),
                option("Go right", "east"),
                option("Get lost", "nowhere"),
            ],
        }]
    );
    assert!(matches!(r.state(), State::AwaitingChoice { .. }));
}

#[test]
fn test_selection_jumps_to_label() {
    let mut r = load(PATHS);
    play(&mut r);
    let directives = r.select_option("east").unwrap();
    assert_eq!(texts(&directives), vec!["\"went right\""]);
    let rest = play_on(&mut r);
    assert_eq!(rest, vec![Directive::EndOfScript]);
}

#[test]
fn test_other_signals_are_ignored_while_choosing() {
    let mut r = load(PATHS);
    play(&mut r);
    assert_eq!(r.advance().unwrap(), vec![]);
    r.skip();
    assert!(matches!(r.state(), State::AwaitingChoice { .. }));
}

#[test]
fn test_destination_not_offered_is_ignored() {
    let mut r = load(PATHS);
    play(&mut r);
    assert_eq!(r.select_option("end").unwrap(), vec![]);
    assert!(matches!(r.state(), State::AwaitingChoice { .. }));
    assert_eq!(texts(&r.select_option("west").unwrap()), vec!["\"went left\""]);
}

#[test]
fn test_unregistered_destination_keeps_choice_open() {
    let mut r = load(PATHS);
    play(&mut r);
    assert_eq!(
        r.select_option("nowhere"),
        Err(RuntimeError::UnknownLabel {
            label: "nowhere".to_string(),
            line: 5
        })
    );
    assert!(matches!(r.state(), State::AwaitingChoice { .. }));
}

#[test]
fn test_unknown_choice_is_an_error() {
    let mut r = load("show choice missing\nPC \"after\"");
    assert_eq!(
        r.start(),
        Err(RuntimeError::UnknownChoice {
            name: "missing".to_string(),
            line: 0
        })
    );
    assert_eq!(texts(&r.advance().unwrap()), vec!["\"after\""]);
}

#[test]
fn test_recreating_a_choice_clears_its_options() {
    let mut r = load(
        "choice create menu\nchoice menu add \"Old\" a\nchoice create menu\nchoice menu add \"New\" b\nshow choice menu\nlabel a\nlabel b",
    );
    let directives = play(&mut r);
    assert_eq!(
        directives,
        vec![Directive::PresentChoice {
            prompt: String::new(),
            options: vec![option("New", "b")],
        }]
    );
}
