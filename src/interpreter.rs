use crate::assets::AssetRegistry;
use crate::directive::{Directive, Signal};
use crate::environment::Environment;
use crate::error::{RuntimeError, ScriptWarning};
use crate::parser::CommandRecord;
use crate::script::Script;
use crate::setup::{is_setup_keyword, push_warning, run_setup_pass, Declarations, SetupOutcome};
use crate::store::{Choice, ChoiceBook, ChoiceOption, LabelTable, VariableStore};
use crate::types::{
    parse_boolean, parse_integer, Channel, ChannelSelection, ClearTarget, StagePosition, Variable,
};

/// Speaker name that stands for the unnamed protagonist.
pub const PROTAGONIST: &str = "PC";

const PAUSE_MARKER: &str = "pause";
const THOUGHT_MARKER: &str = "thought";

type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Commands one signal may dispatch before giving up on a runaway loop.
    pub max_dispatch_steps: usize,
    /// `advance()` during a reveal finishes it instead of being ignored.
    pub advance_completes_reveal: bool,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_dispatch_steps: 10_000,
            advance_completes_reveal: false,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum State {
    Ready,
    Dispatching,
    AwaitingAdvance,
    Revealing,
    AwaitingChoice { choice: Choice, line: usize },
    Finished,
}

enum Flow {
    Continue,
    Suspend,
}

/// Runs a script one suspension at a time.
///
/// Every signal method returns the directives produced while handling it.
/// Signals that arrive in a state that does not expect them do nothing.
pub struct Interpreter {
    script: Script,
    labels: LabelTable,
    assets: AssetRegistry,
    variables: VariableStore,
    choices: ChoiceBook,
    environment: Environment,
    state: State,
    entry_line: Option<usize>,
    options: InterpreterOptions,
    warnings: Vec<ScriptWarning>,
    outbox: Vec<Directive>,
}

impl Interpreter {
    /// Reads `source` and runs the setup pass. Nothing is dispatched until
    /// [`Interpreter::start`].
    pub fn load(source: &str, options: InterpreterOptions) -> Self {
        let mut script = Script::new(source);
        let SetupOutcome {
            declarations:
                Declarations {
                    labels,
                    assets,
                    variables,
                },
            entry_line,
            warnings,
        } = run_setup_pass(&mut script);

        Self {
            script,
            labels,
            assets,
            variables,
            choices: ChoiceBook::new(),
            environment: Environment::new(),
            state: State::Ready,
            entry_line,
            options,
            warnings,
            outbox: Vec::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn choices(&self) -> &ChoiceBook {
        &self.choices
    }

    pub fn entry_line(&self) -> Option<usize> {
        self.entry_line
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    /// Warnings gathered since the last call, setup warnings included.
    pub fn take_warnings(&mut self) -> Vec<ScriptWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn start(&mut self) -> Result<Vec<Directive>> {
        if self.state != State::Ready {
            return Ok(Vec::new());
        }
        let line = self.entry_line.unwrap_or_else(|| self.script.line_count());
        self.script.relocate(line);
        self.dispatch()
    }

    pub fn advance(&mut self) -> Result<Vec<Directive>> {
        match self.state {
            State::AwaitingAdvance => self.dispatch(),
            State::Revealing if self.options.advance_completes_reveal => {
                self.skip();
                Ok(Vec::new())
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Reveals one more character of the current text.
    pub fn tick(&mut self) {
        if self.state == State::Revealing {
            self.environment.reveal_one();
            self.settle_reveal();
        }
    }

    pub fn skip(&mut self) {
        if self.state == State::Revealing {
            self.environment.reveal_all();
            self.settle_reveal();
        }
    }

    /// Picks the option of the open choice that leads to `destination`.
    ///
    /// Destinations the choice does not offer are ignored. If the label is
    /// not registered the choice stays open.
    pub fn select_option(&mut self, destination: &str) -> Result<Vec<Directive>> {
        let State::AwaitingChoice { choice, line } = &self.state else {
            return Ok(Vec::new());
        };
        if !choice.offers(destination) {
            tracing::warn!(
                choice = %choice.name,
                destination,
                "ignoring selection that is not offered"
            );
            return Ok(Vec::new());
        }
        let Some(target) = self.labels.resolve(destination) else {
            return Err(RuntimeError::UnknownLabel {
                label: destination.to_string(),
                line: *line,
            });
        };

        tracing::debug!(destination, target, "option selected");
        self.script.relocate(target);
        self.dispatch()
    }

    pub fn handle(&mut self, signal: Signal) -> Result<Vec<Directive>> {
        match signal {
            Signal::Advance => self.advance(),
            Signal::Tick => {
                self.tick();
                Ok(Vec::new())
            }
            Signal::Skip => {
                self.skip();
                Ok(Vec::new())
            }
            Signal::SelectOption(destination) => self.select_option(&destination),
        }
    }

    fn settle_reveal(&mut self) {
        if self.environment.is_fully_revealed() {
            self.state = State::AwaitingAdvance;
        }
    }

    fn dispatch(&mut self) -> Result<Vec<Directive>> {
        self.state = State::Dispatching;
        match self.run_until_suspended() {
            Ok(()) => Ok(std::mem::take(&mut self.outbox)),
            Err(err) => {
                // Directives already applied to the environment stay queued and
                // go out with the next dispatch.
                tracing::warn!(error = %err, pending = self.outbox.len(), "dispatch stopped");
                self.state = State::AwaitingAdvance;
                Err(err)
            }
        }
    }

    fn run_until_suspended(&mut self) -> Result<()> {
        let mut steps = 0;
        loop {
            let Some(record) = self.script.next_record(&mut self.warnings) else {
                self.finish();
                return Ok(());
            };
            let Some(name) = record.name() else {
                continue;
            };
            if is_setup_keyword(name) {
                continue;
            }

            steps += 1;
            if steps > self.options.max_dispatch_steps {
                return Err(RuntimeError::StepLimitExceeded {
                    limit: self.options.max_dispatch_steps,
                });
            }

            tracing::debug!(line = record.line() + 1, command = name, "dispatch");
            if let Flow::Suspend = self.execute(&record)? {
                return Ok(());
            }
        }
    }

    fn finish(&mut self) {
        tracing::info!("script finished");
        self.state = State::Finished;
        self.outbox.push(Directive::EndOfScript);
    }

    fn warn(&mut self, warning: ScriptWarning) {
        push_warning(&mut self.warnings, warning);
    }

    fn require<'r>(
        &mut self,
        record: &'r CommandRecord,
        value: Option<&'r str>,
        argument: &'static str,
    ) -> Option<&'r str> {
        if value.is_none() {
            self.warn(ScriptWarning::MissingArgument {
                line: record.line(),
                command: record.name().unwrap_or_default().to_string(),
                argument,
            });
        }
        value
    }

    fn execute(&mut self, record: &CommandRecord) -> Result<Flow> {
        match record.name().unwrap_or_default() {
            "jump" => {
                if let Some(label) = self.require(record, record.arg(1), "label name") {
                    self.jump(label, record.line())?;
                }
                Ok(Flow::Continue)
            }
            "if" => {
                self.execute_if(record)?;
                Ok(Flow::Continue)
            }
            "add" | "subtract" => {
                self.execute_arithmetic(record);
                Ok(Flow::Continue)
            }
            "set" => {
                self.execute_set(record);
                Ok(Flow::Continue)
            }
            "show" => self.execute_show(record),
            "clear" => {
                let args = record.args_without(&[PAUSE_MARKER]);
                let target = match args.first().and_then(|name| StagePosition::from_name(name)) {
                    Some(position) => {
                        self.environment.clear(position);
                        ClearTarget::Slot(position)
                    }
                    None => {
                        self.environment.clear_all();
                        ClearTarget::All
                    }
                };
                self.outbox.push(Directive::ClearSlot { target });
                Ok(self.pause_if_marked(record))
            }
            "play" => {
                self.execute_play(record);
                Ok(self.pause_if_marked(record))
            }
            "stop" => {
                let args = record.args_without(&[PAUSE_MARKER]);
                let channel = ChannelSelection::from_name(args.first().copied());
                for one in [Channel::Sound, Channel::Music] {
                    if channel.includes(one) {
                        self.environment.set_playing(one, None);
                    }
                }
                self.outbox.push(Directive::StopChannel { channel });
                Ok(self.pause_if_marked(record))
            }
            "choice" => {
                self.execute_choice(record);
                Ok(Flow::Continue)
            }
            _ => {
                self.execute_dialogue(record);
                Ok(Flow::Suspend)
            }
        }
    }

    fn pause_if_marked(&mut self, record: &CommandRecord) -> Flow {
        if record.contains(PAUSE_MARKER) {
            self.state = State::AwaitingAdvance;
            Flow::Suspend
        } else {
            Flow::Continue
        }
    }

    fn jump(&mut self, label: &str, line: usize) -> Result<()> {
        let target = self
            .labels
            .resolve(label)
            .ok_or_else(|| RuntimeError::UnknownLabel {
                label: label.to_string(),
                line,
            })?;
        tracing::debug!(label, target, "jump");
        self.script.relocate(target);
        Ok(())
    }

    fn execute_if(&mut self, record: &CommandRecord) -> Result<()> {
        let line = record.line();
        let Some(name) = self.require(record, record.arg(1), "variable name") else {
            return Ok(());
        };
        let Some(current) = self.variables.get(name) else {
            return Ok(());
        };
        let (Some(operator), Some(text), Some(label)) = (
            self.require(record, record.arg(2), "operator"),
            self.require(record, record.arg(3), "value"),
            self.require(record, record.arg(4), "label name"),
        ) else {
            return Ok(());
        };

        let holds = match current {
            Variable::Boolean(stored) => match parse_boolean(text) {
                Some(value) => value == stored,
                None => {
                    self.warn(ScriptWarning::MalformedBoolean {
                        line,
                        value: text.to_string(),
                    });
                    false
                }
            },
            Variable::Integer(stored) => {
                let Some(value) = parse_integer(text) else {
                    self.warn(ScriptWarning::MalformedInteger {
                        line,
                        value: text.to_string(),
                    });
                    return Ok(());
                };
                match operator {
                    "<" => stored < value,
                    ">" => stored > value,
                    "=" => stored == value,
                    _ => {
                        self.warn(ScriptWarning::UnknownOperator {
                            line,
                            operator: operator.to_string(),
                        });
                        false
                    }
                }
            }
        };

        if holds {
            self.jump(label, line)?;
        }
        Ok(())
    }

    fn execute_arithmetic(&mut self, record: &CommandRecord) {
        let line = record.line();
        let (Some(name), Some(text)) = (
            self.require(record, record.arg(1), "variable name"),
            self.require(record, record.arg(2), "amount"),
        ) else {
            return;
        };
        let Some(amount) = parse_integer(text) else {
            self.warn(ScriptWarning::MalformedInteger {
                line,
                value: text.to_string(),
            });
            return;
        };

        let result = if record.name() == Some("add") {
            self.variables.add(name, amount)
        } else {
            self.variables.subtract(name, amount)
        };
        match result {
            Ok(value) => tracing::debug!(variable = name, value, "updated"),
            Err(source) => self.warn(ScriptWarning::Variable { line, source }),
        }
    }

    fn execute_set(&mut self, record: &CommandRecord) {
        let line = record.line();
        let (Some(name), Some(text)) = (
            self.require(record, record.arg(1), "variable name"),
            self.require(record, record.arg(2), "value"),
        ) else {
            return;
        };

        let result = if let Some(value) = parse_integer(text) {
            self.variables.set_integer(name, value)
        } else if let Some(value) = parse_boolean(text) {
            self.variables.set_boolean(name, value)
        } else {
            let warning = match self.variables.get(name) {
                Some(Variable::Boolean(_)) => ScriptWarning::MalformedBoolean {
                    line,
                    value: text.to_string(),
                },
                _ => ScriptWarning::MalformedInteger {
                    line,
                    value: text.to_string(),
                },
            };
            self.warn(warning);
            return;
        };
        if let Err(source) = result {
            self.warn(ScriptWarning::Variable { line, source });
        }
    }

    fn execute_show(&mut self, record: &CommandRecord) -> Result<Flow> {
        let line = record.line();
        let args = record.args_without(&[PAUSE_MARKER]);

        match args.as_slice() {
            ["choice", name, ..] => return self.show_choice(name, line),
            [] => {
                self.require(record, None, "name");
            }
            [name] => match self.assets.background(name) {
                Some(background) => {
                    let directive = Directive::ShowBackground {
                        name: background.name.clone(),
                        image: background.location.clone(),
                    };
                    self.environment.set_background(name);
                    self.outbox.push(directive);
                }
                None => self.warn(ScriptWarning::UnknownAsset {
                    line,
                    what: "background",
                    name: name.to_string(),
                }),
            },
            [name, mood, rest @ ..] => {
                let position = rest
                    .first()
                    .and_then(|position| StagePosition::from_name(position))
                    .unwrap_or(StagePosition::Center);
                self.show_character(name, mood, position, line);
            }
        }
        Ok(self.pause_if_marked(record))
    }

    fn show_character(&mut self, name: &str, mood: &str, position: StagePosition, line: usize) {
        let Some(character) = self.assets.character(name) else {
            self.warn(ScriptWarning::UnknownAsset {
                line,
                what: "character",
                name: name.to_string(),
            });
            return;
        };
        let Some(found) = character.mood(mood) else {
            self.warn(ScriptWarning::UnknownAsset {
                line,
                what: "mood",
                name: format!("{} {}", name, mood),
            });
            return;
        };

        let directive = Directive::ShowCharacter {
            name: character.name.clone(),
            mood: found.name.clone(),
            image: found.image.clone(),
            position,
        };
        self.environment.stage(position, name, mood);
        self.outbox.push(directive);
    }

    fn show_choice(&mut self, name: &str, line: usize) -> Result<Flow> {
        let choice = self
            .choices
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownChoice {
                name: name.to_string(),
                line,
            })?;

        self.outbox.push(Directive::PresentChoice {
            prompt: choice.prompt.clone(),
            options: choice.options.clone(),
        });
        self.state = State::AwaitingChoice { choice, line };
        Ok(Flow::Suspend)
    }

    fn execute_play(&mut self, record: &CommandRecord) {
        let line = record.line();
        let args = record.args_without(&[PAUSE_MARKER]);
        let Some(name) = self.require(record, args.first().copied(), "sound name") else {
            return;
        };
        let repeat = args.iter().skip(1).any(|arg| *arg == "r" || *arg == "repeat");
        let volume = match args.get(1) {
            Some(text) if *text != "r" && *text != "repeat" => {
                match text.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0) {
                    Some(volume) => volume,
                    None => {
                        self.warn(ScriptWarning::MalformedNumber {
                            line,
                            value: text.to_string(),
                        });
                        1.0
                    }
                }
            }
            _ => 1.0,
        };

        let (channel, asset) = match (self.assets.sound(name), self.assets.song(name)) {
            (Some(sound), _) => (Channel::Sound, sound),
            (None, Some(song)) => (Channel::Music, song),
            (None, None) => {
                self.warn(ScriptWarning::UnknownAsset {
                    line,
                    what: "sound",
                    name: name.to_string(),
                });
                return;
            }
        };

        let directive = Directive::PlaySound {
            name: asset.name.clone(),
            location: asset.location.clone(),
            channel,
            volume,
            repeat,
        };
        self.environment.set_playing(channel, Some(name));
        self.outbox.push(directive);
    }

    fn execute_choice(&mut self, record: &CommandRecord) {
        let line = record.line();
        let Some(first) = self.require(record, record.arg(1), "choice name") else {
            return;
        };

        if first == "create" {
            if let Some(name) = self.require(record, record.arg(2), "choice name") {
                self.choices.create(name);
            }
            return;
        }

        let edit = match (record.arg(2), record.arg(3)) {
            (Some("set"), Some("text")) => self
                .require(record, record.arg(4), "prompt text")
                .map(|text| (text, None)),
            (Some("add"), _) => match (
                self.require(record, record.arg(3), "option text"),
                self.require(record, record.arg(4), "label name"),
            ) {
                (Some(text), Some(label)) => Some((text, Some(label))),
                _ => None,
            },
            _ => {
                self.warn(ScriptWarning::MissingArgument {
                    line,
                    command: "choice".to_string(),
                    argument: "`set text` or `add`",
                });
                None
            }
        };
        let Some((text, destination)) = edit else {
            return;
        };

        let Some(choice) = self.choices.get_mut(first) else {
            self.warn(ScriptWarning::UnknownChoice {
                line,
                name: first.to_string(),
            });
            return;
        };
        match destination {
            Some(destination) => choice.options.push(ChoiceOption {
                text: text.to_string(),
                destination: destination.to_string(),
            }),
            None => choice.prompt = text.to_string(),
        }
    }

    fn execute_dialogue(&mut self, record: &CommandRecord) {
        let (speaker, text, narration) = match (record.arg(0), record.arg(1)) {
            (Some(speaker), Some(text)) => (Some(speaker), text, false),
            (Some(text), None) => (None, text, true),
            _ => (None, "", true),
        };
        let is_thought = record.arg(2) == Some(THOUGHT_MARKER);
        let speaker = speaker.filter(|name| *name != PROTAGONIST);

        let shown = if is_thought || narration {
            text.to_string()
        } else {
            format!("\"{}\"", text)
        };
        let color = speaker
            .and_then(|name| self.assets.character(name))
            .map(|character| character.color);

        self.outbox.push(Directive::ShowText {
            speaker: speaker.map(str::to_string),
            text: shown.clone(),
            is_thought,
            color,
        });
        self.environment.set_text(speaker, shown);
        self.state = State::Revealing;
        self.settle_reveal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgb;

    fn load(source: &str) -> Interpreter {
        Interpreter::load(source, InterpreterOptions::default())
    }

    #[test]
    fn test_start_runs_to_first_dialogue() {
        let mut interpreter =
            load("character Ana \"a.png\"\nshow Ana default\nAna \"Hello\"\nPC \"Bye\"");
        let directives = interpreter.start().unwrap();
        assert_eq!(
            directives,
            vec![
                Directive::ShowCharacter {
                    name: "Ana".to_string(),
                    mood: "default".to_string(),
                    image: "a.png".to_string(),
                    position: StagePosition::Center,
                },
                Directive::ShowText {
                    speaker: Some("Ana".to_string()),
                    text: "\"Hello\"".to_string(),
                    is_thought: false,
                    color: Some(Rgb::WHITE),
                },
            ]
        );
        assert_eq!(interpreter.state(), &State::Revealing);
    }

    #[test]
    fn test_signals_before_start_are_ignored() {
        let mut interpreter = load("PC \"hi\"");
        assert_eq!(interpreter.advance().unwrap(), vec![]);
        interpreter.tick();
        assert_eq!(interpreter.state(), &State::Ready);
    }

    #[test]
    fn test_reveal_then_advance() {
        let mut interpreter = load("PC \"hi\"\nPC \"next\"");
        interpreter.start().unwrap();
        assert_eq!(interpreter.environment().full_text(), "\"hi\"");
        assert_eq!(interpreter.advance().unwrap(), vec![]);
        for _ in 0..3 {
            interpreter.tick();
        }
        assert_eq!(interpreter.state(), &State::Revealing);
        interpreter.tick();
        assert_eq!(interpreter.state(), &State::AwaitingAdvance);
        let directives = interpreter.advance().unwrap();
        assert!(matches!(&directives[0], Directive::ShowText { text, .. } if text == "\"next\""));
    }

    #[test]
    fn test_advance_completes_reveal_option() {
        let options = InterpreterOptions {
            advance_completes_reveal: true,
            ..InterpreterOptions::default()
        };
        let mut interpreter = Interpreter::load("PC \"hello\"", options);
        interpreter.start().unwrap();
        interpreter.advance().unwrap();
        assert_eq!(interpreter.state(), &State::AwaitingAdvance);
        assert_eq!(interpreter.environment().revealed_text(), "\"hello\"");
        assert_eq!(interpreter.advance().unwrap(), vec![Directive::EndOfScript]);
        assert!(interpreter.is_finished());
    }

    #[test]
    fn test_thought_and_narration() {
        let mut interpreter = load("PC \"hmm\" thought\nNarration");
        let directives = interpreter.start().unwrap();
        assert_eq!(
            directives,
            vec![Directive::ShowText {
                speaker: None,
                text: "hmm".to_string(),
                is_thought: true,
                color: None,
            }]
        );
        interpreter.skip();
        let directives = interpreter.advance().unwrap();
        assert!(matches!(
            &directives[0],
            Directive::ShowText { speaker: None, text, .. } if text == "Narration"
        ));
    }

    #[test]
    fn test_pause_marker_suspends_and_is_stripped() {
        let mut interpreter = load("image forest \"forest.png\"\nshow forest pause\nPC \"x\"");
        let directives = interpreter.start().unwrap();
        assert_eq!(
            directives,
            vec![Directive::ShowBackground {
                name: "forest".to_string(),
                image: "forest.png".to_string(),
            }]
        );
        assert_eq!(interpreter.state(), &State::AwaitingAdvance);
        assert_eq!(interpreter.environment().background(), "forest");
    }

    #[test]
    fn test_unknown_label_leaves_interpreter_usable() {
        let mut interpreter = load("jump nowhere\nPC \"after\"");
        let err = interpreter.start().unwrap_err();
        assert_eq!(
            err,
            RuntimeError::UnknownLabel {
                label: "nowhere".to_string(),
                line: 0
            }
        );
        assert_eq!(interpreter.state(), &State::AwaitingAdvance);
        let directives = interpreter.advance().unwrap();
        assert!(matches!(&directives[0], Directive::ShowText { .. }));
    }

    #[test]
    fn test_step_limit() {
        let options = InterpreterOptions {
            max_dispatch_steps: 50,
            ..InterpreterOptions::default()
        };
        let mut interpreter = Interpreter::load("label top\njump top", options);
        assert_eq!(
            interpreter.start(),
            Err(RuntimeError::StepLimitExceeded { limit: 50 })
        );
    }

    #[test]
    fn test_if_on_unknown_variable_is_silent() {
        let mut interpreter = load("if ghost = 1 end\nPC \"x\"\nlabel end");
        interpreter.start().unwrap();
        assert_eq!(interpreter.state(), &State::Revealing);
        assert!(interpreter.take_warnings().is_empty());
    }

    #[test]
    fn test_set_reports_kind_mismatch() {
        let mut interpreter = load("bool met false\nset met 3\nset met TRUE\nPC \"x\"");
        interpreter.start().unwrap();
        assert_eq!(interpreter.variables().get("met"), Some(Variable::Boolean(true)));
        let warnings = interpreter.take_warnings();
        assert!(matches!(warnings[0], ScriptWarning::Variable { line: 1, .. }));
    }

    #[test]
    fn test_unknown_assets_emit_nothing() {
        let mut interpreter = load("show nowhere\nplay nothing\nshow Nobody happy\nPC \"x\"");
        let directives = interpreter.start().unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(interpreter.take_warnings().len(), 3);
    }

    #[test]
    fn test_finished_ignores_signals() {
        let mut interpreter = load("label only");
        assert_eq!(interpreter.start().unwrap(), vec![Directive::EndOfScript]);
        assert_eq!(interpreter.advance().unwrap(), vec![]);
        assert_eq!(interpreter.handle(Signal::Skip).unwrap(), vec![]);
        assert!(interpreter.is_finished());
    }
}
