use crate::error::VariableError;
use crate::types::Variable;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

type Result<T> = std::result::Result<T, VariableError>;

/// Typed script variables. A name keeps the kind it was declared with for
/// the whole run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct VariableStore {
    vars: BTreeMap<String, Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and leaves the old value alone if `name` exists.
    pub fn declare(&mut self, name: &str, value: Variable) -> bool {
        if self.vars.contains_key(name) {
            return false;
        }
        self.vars.insert(name.to_string(), value);
        true
    }

    pub fn get(&self, name: &str) -> Option<Variable> {
        self.vars.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Variable)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn add(&mut self, name: &str, delta: i64) -> Result<i64> {
        let current = self.integer_mut(name)?;
        *current = current
            .checked_add(delta)
            .ok_or_else(|| VariableError::Overflow(name.to_string()))?;
        Ok(*current)
    }

    pub fn subtract(&mut self, name: &str, delta: i64) -> Result<i64> {
        let current = self.integer_mut(name)?;
        *current = current
            .checked_sub(delta)
            .ok_or_else(|| VariableError::Overflow(name.to_string()))?;
        Ok(*current)
    }

    pub fn set_integer(&mut self, name: &str, value: i64) -> Result<()> {
        *self.integer_mut(name)? = value;
        Ok(())
    }

    pub fn set_boolean(&mut self, name: &str, value: bool) -> Result<()> {
        match self.vars.get_mut(name) {
            Some(Variable::Boolean(current)) => {
                *current = value;
                Ok(())
            }
            Some(Variable::Integer(_)) => Err(VariableError::KindMismatch {
                name: name.to_string(),
                expected: "a boolean",
            }),
            None => Err(VariableError::Unknown(name.to_string())),
        }
    }

    fn integer_mut(&mut self, name: &str) -> Result<&mut i64> {
        match self.vars.get_mut(name) {
            Some(Variable::Integer(current)) => Ok(current),
            Some(Variable::Boolean(_)) => Err(VariableError::KindMismatch {
                name: name.to_string(),
                expected: "an integer",
            }),
            None => Err(VariableError::Unknown(name.to_string())),
        }
    }
}

/// Label name to the line execution resumes at.
#[derive(Debug, Default, Clone, Serialize)]
pub struct LabelTable {
    labels: HashMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the label was already registered; the first
    /// registration is kept.
    pub fn register(&mut self, name: &str, line: usize) -> bool {
        if self.labels.contains_key(name) {
            return false;
        }
        self.labels.insert(name.to_string(), line);
        true
    }

    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels ordered by target line.
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut labels: Vec<(&str, usize)> = self
            .labels
            .iter()
            .map(|(name, line)| (name.as_str(), *line))
            .collect();
        labels.sort_by_key(|(name, line)| (*line, *name));
        labels
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct ChoiceOption {
    pub text: String,
    pub destination: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct Choice {
    pub name: String,
    pub prompt: String,
    pub options: Vec<ChoiceOption>,
}

impl Choice {
    pub fn offers(&self, destination: &str) -> bool {
        self.options.iter().any(|option| option.destination == destination)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ChoiceBook {
    choices: HashMap<String, Choice>,
}

impl ChoiceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creating an existing choice starts it over, so a script that loops
    /// back over its `choice` lines does not pile up duplicate options.
    pub fn create(&mut self, name: &str) {
        self.choices.insert(
            name.to_string(),
            Choice {
                name: name.to_string(),
                ..Choice::default()
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Choice> {
        self.choices.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Choice> {
        self.choices.get_mut(name)
    }
}
