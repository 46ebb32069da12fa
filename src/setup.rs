use crate::assets::{AssetRegistry, DEFAULT_MOOD};
use crate::error::ScriptWarning;
use crate::parser::CommandRecord;
use crate::script::Script;
use crate::store::{LabelTable, VariableStore};
use crate::types::{parse_boolean, parse_integer, Rgb, Variable};

/// Commands run once, before play, wherever they appear in the script.
pub const SETUP_KEYWORDS: [&str; 8] = [
    "label",
    "character",
    "image",
    "sound",
    "music",
    "int",
    "bool",
    "color",
];

pub fn is_setup_keyword(name: &str) -> bool {
    SETUP_KEYWORDS.contains(&name)
}

/// Tables filled in by the setup pass.
#[derive(Debug, Default, Clone)]
pub struct Declarations {
    pub labels: LabelTable,
    pub assets: AssetRegistry,
    pub variables: VariableStore,
}

#[derive(Debug, Default)]
pub struct SetupOutcome {
    pub declarations: Declarations,
    /// First line that is neither blank nor a setup command.
    pub entry_line: Option<usize>,
    pub warnings: Vec<ScriptWarning>,
}

/// Reads the whole script once from the top, registering every declaration.
///
/// Scanning does not stop at the first playable line, so declarations placed
/// after dialogue are registered too.
pub fn run_setup_pass(script: &mut Script) -> SetupOutcome {
    let mut outcome = SetupOutcome::default();
    script.relocate(0);

    while let Some(record) = script.next_record(&mut outcome.warnings) {
        let Some(name) = record.name() else {
            continue;
        };
        if is_setup_keyword(name) {
            outcome
                .declarations
                .declare(&record, &mut outcome.warnings);
        } else if outcome.entry_line.is_none() {
            outcome.entry_line = Some(record.line());
        }
    }

    tracing::info!(
        labels = outcome.declarations.labels.len(),
        characters = outcome.declarations.assets.characters().len(),
        entry_line = ?outcome.entry_line,
        warnings = outcome.warnings.len(),
        "setup pass finished"
    );
    outcome
}

fn required<'r>(
    record: &'r CommandRecord,
    index: usize,
    argument: &'static str,
    warnings: &mut Vec<ScriptWarning>,
) -> Option<&'r str> {
    let value = record.arg(index);
    if value.is_none() {
        push_warning(
            warnings,
            ScriptWarning::MissingArgument {
                line: record.line(),
                command: record.name().unwrap_or_default().to_string(),
                argument,
            },
        );
    }
    value
}

pub(crate) fn push_warning(warnings: &mut Vec<ScriptWarning>, warning: ScriptWarning) {
    tracing::warn!("{}", warning);
    warnings.push(warning);
}

impl Declarations {
    /// Executes one setup command. Problems are reported and the command is
    /// skipped.
    pub fn declare(&mut self, record: &CommandRecord, warnings: &mut Vec<ScriptWarning>) {
        let line = record.line();
        match record.name().unwrap_or_default() {
            "label" => {
                let Some(text) = required(record, 1, "target line", warnings) else {
                    return;
                };
                let Ok(target) = text.parse::<usize>() else {
                    // Only a quoted "label" can get here without a line number.
                    push_warning(
                        warnings,
                        ScriptWarning::MalformedInteger {
                            line,
                            value: text.to_string(),
                        },
                    );
                    return;
                };
                let Some(name) = required(record, 2, "label name", warnings) else {
                    return;
                };
                if !self.labels.register(name, target) {
                    push_warning(
                        warnings,
                        ScriptWarning::Redeclared {
                            line,
                            what: "label",
                            name: name.to_string(),
                        },
                    );
                }
            }
            "character" => {
                let Some(name) = required(record, 1, "character name", warnings) else {
                    return;
                };
                let mood = match (record.arg(2), record.arg(3)) {
                    (Some(mood), Some(image)) => Some((mood, image)),
                    (Some(image), None) => Some((DEFAULT_MOOD, image)),
                    _ => None,
                };
                if !self.assets.create_character(name, mood) {
                    push_warning(
                        warnings,
                        ScriptWarning::Redeclared {
                            line,
                            what: "character",
                            name: name.to_string(),
                        },
                    );
                }
            }
            "color" => self.declare_color(record, warnings),
            "image" => {
                let (Some(name), Some(second)) = (
                    required(record, 1, "image name", warnings),
                    required(record, 2, "image path", warnings),
                ) else {
                    return;
                };
                match record.arg(3) {
                    None => self.assets.create_background(name, second),
                    Some(image) => match self.assets.character_mut(name) {
                        Some(character) => character.add_mood(second, image),
                        None => push_warning(
                            warnings,
                            ScriptWarning::UnknownAsset {
                                line,
                                what: "character",
                                name: name.to_string(),
                            },
                        ),
                    },
                }
            }
            "sound" | "music" => {
                let (Some(name), Some(location)) = (
                    required(record, 1, "name", warnings),
                    required(record, 2, "file path", warnings),
                ) else {
                    return;
                };
                if record.name() == Some("sound") {
                    self.assets.create_sound(name, location);
                } else {
                    self.assets.create_song(name, location);
                }
            }
            "int" | "bool" => self.declare_variable(record, warnings),
            _ => {}
        }
    }

    fn declare_variable(&mut self, record: &CommandRecord, warnings: &mut Vec<ScriptWarning>) {
        let line = record.line();
        let (Some(name), Some(text)) = (
            required(record, 1, "variable name", warnings),
            required(record, 2, "initial value", warnings),
        ) else {
            return;
        };

        let value = if record.name() == Some("int") {
            parse_integer(text).map(Variable::Integer).ok_or_else(|| {
                ScriptWarning::MalformedInteger {
                    line,
                    value: text.to_string(),
                }
            })
        } else {
            parse_boolean(text).map(Variable::Boolean).ok_or_else(|| {
                ScriptWarning::MalformedBoolean {
                    line,
                    value: text.to_string(),
                }
            })
        };

        match value {
            Ok(value) => {
                if !self.variables.declare(name, value) {
                    push_warning(
                        warnings,
                        ScriptWarning::Redeclared {
                            line,
                            what: "variable",
                            name: name.to_string(),
                        },
                    );
                }
            }
            Err(warning) => push_warning(warnings, warning),
        }
    }

    fn declare_color(&mut self, record: &CommandRecord, warnings: &mut Vec<ScriptWarning>) {
        let line = record.line();
        let Some(name) = required(record, 1, "character name", warnings) else {
            return;
        };

        let mut components = [0u8; 3];
        for (i, component) in components.iter_mut().enumerate() {
            let Some(text) = required(record, i + 2, "color component", warnings) else {
                return;
            };
            match text.parse::<u8>() {
                Ok(value) => *component = value,
                Err(_) => {
                    push_warning(
                        warnings,
                        ScriptWarning::MalformedNumber {
                            line,
                            value: text.to_string(),
                        },
                    );
                    return;
                }
            }
        }

        let [r, g, b] = components;
        match self.assets.character_mut(name) {
            Some(character) => character.color = Rgb { r, g, b },
            None => push_warning(
                warnings,
                ScriptWarning::UnknownAsset {
                    line,
                    what: "character",
                    name: name.to_string(),
                },
            ),
        }
    }
}
