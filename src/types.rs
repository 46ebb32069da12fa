use serde::Serialize;
use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum Variable {
    Integer(i64),
    Boolean(bool),
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Variable::Integer(value) => write!(f, "{}", value),
            Variable::Boolean(value) => write!(f, "{}", value),
        }
    }
}

/// Integer literal as scripts write it: optional sign and surrounding blanks.
pub fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .parse::<i64>()
        .ok()
}

/// `true`/`false` in any letter case.
pub fn parse_boolean(text: &str) -> Option<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StagePosition {
    Left,
    Center,
    Right,
}

impl StagePosition {
    pub const ALL: [StagePosition; 3] = [
        StagePosition::Left,
        StagePosition::Center,
        StagePosition::Right,
    ];

    pub fn from_name(name: &str) -> Option<StagePosition> {
        match name {
            "left" => Some(StagePosition::Left),
            "center" => Some(StagePosition::Center),
            "right" => Some(StagePosition::Right),
            _ => None,
        }
    }
}

impl fmt::Display for StagePosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StagePosition::Left => write!(f, "left"),
            StagePosition::Center => write!(f, "center"),
            StagePosition::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearTarget {
    Slot(StagePosition),
    All,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sound,
    Music,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Channel::Sound => write!(f, "sound"),
            Channel::Music => write!(f, "music"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelSelection {
    One(Channel),
    Both,
}

impl ChannelSelection {
    pub fn from_name(name: Option<&str>) -> ChannelSelection {
        match name {
            Some("sound") => ChannelSelection::One(Channel::Sound),
            Some("music") => ChannelSelection::One(Channel::Music),
            _ => ChannelSelection::Both,
        }
    }

    pub fn includes(&self, channel: Channel) -> bool {
        match self {
            ChannelSelection::One(one) => *one == channel,
            ChannelSelection::Both => true,
        }
    }
}

/// Name color of a character.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}
