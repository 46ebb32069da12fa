use crate::store::ChoiceOption;
use crate::types::{Channel, ChannelSelection, ClearTarget, Rgb, StagePosition};
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

/// Instructions for the presentation layer. The interpreter only produces
/// these; drawing, fading and audio playback happen elsewhere.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
pub enum Directive {
    ShowBackground {
        name: String,
        image: String,
    },
    ShowCharacter {
        name: String,
        mood: String,
        image: String,
        position: StagePosition,
    },
    ClearSlot {
        target: ClearTarget,
    },
    ShowText {
        speaker: Option<String>,
        text: String,
        is_thought: bool,
        color: Option<Rgb>,
    },
    PlaySound {
        name: String,
        location: String,
        channel: Channel,
        volume: f64,
        repeat: bool,
    },
    StopChannel {
        channel: ChannelSelection,
    },
    PresentChoice {
        prompt: String,
        options: Vec<ChoiceOption>,
    },
    EndOfScript,
}

/// Input from whatever owns time and the player's clicks.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Signal {
    Advance,
    Tick,
    Skip,
    SelectOption(String),
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("unknown signal {0:?}, expected advance, tick, skip or select <label>")]
pub struct UnknownSignal(pub String);

impl FromStr for Signal {
    type Err = UnknownSignal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("advance"), None, _) => Ok(Signal::Advance),
            (Some("tick"), None, _) => Ok(Signal::Tick),
            (Some("skip"), None, _) => Ok(Signal::Skip),
            (Some("select"), Some(label), None) => Ok(Signal::SelectOption(label.to_string())),
            _ => Err(UnknownSignal(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_from_str() {
        assert_eq!("advance".parse(), Ok(Signal::Advance));
        assert_eq!(" tick ".parse(), Ok(Signal::Tick));
        assert_eq!(
            "select ending".parse(),
            Ok(Signal::SelectOption("ending".to_string()))
        );
        assert!("select".parse::<Signal>().is_err());
        assert!("jump now".parse::<Signal>().is_err());
    }

    #[test]
    fn test_unknown_signal_message() {
        let err = "wait".parse::<Signal>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown signal \"wait\", expected advance, tick, skip or select <label>"
        );
    }

    #[test]
    fn test_directive_json_shape() {
        let directive = Directive::ShowCharacter {
            name: "Ana".to_string(),
            mood: "default".to_string(),
            image: "a.png".to_string(),
            position: StagePosition::Center,
        };
        let json = serde_json::to_value(&directive).unwrap();
        assert_eq!(json["directive"], "show_character");
        assert_eq!(json["position"], "center");
    }
}
