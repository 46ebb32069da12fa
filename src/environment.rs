use crate::types::{Channel, StagePosition};

pub const DEFAULT_BACKGROUND: &str = "default_black";

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StagedCharacter {
    pub name: String,
    pub mood: String,
}

/// What is currently on screen and playing, as far as the script knows.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    background: Option<String>,
    left: Option<StagedCharacter>,
    center: Option<StagedCharacter>,
    right: Option<StagedCharacter>,
    speaker: Option<String>,
    full_text: String,
    revealed: usize,
    sound: Option<String>,
    music: Option<String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background(&self) -> &str {
        self.background.as_deref().unwrap_or(DEFAULT_BACKGROUND)
    }

    pub(crate) fn set_background(&mut self, name: &str) {
        self.background = Some(name.to_string());
    }

    pub fn slot(&self, position: StagePosition) -> Option<&StagedCharacter> {
        match position {
            StagePosition::Left => self.left.as_ref(),
            StagePosition::Center => self.center.as_ref(),
            StagePosition::Right => self.right.as_ref(),
        }
    }

    fn slot_mut(&mut self, position: StagePosition) -> &mut Option<StagedCharacter> {
        match position {
            StagePosition::Left => &mut self.left,
            StagePosition::Center => &mut self.center,
            StagePosition::Right => &mut self.right,
        }
    }

    pub(crate) fn stage(&mut self, position: StagePosition, name: &str, mood: &str) {
        *self.slot_mut(position) = Some(StagedCharacter {
            name: name.to_string(),
            mood: mood.to_string(),
        });
    }

    pub(crate) fn clear(&mut self, position: StagePosition) {
        *self.slot_mut(position) = None;
    }

    pub(crate) fn clear_all(&mut self) {
        for position in StagePosition::ALL {
            self.clear(position);
        }
    }

    pub fn speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }

    /// Starts revealing a new line of text from its first character.
    pub(crate) fn set_text(&mut self, speaker: Option<&str>, text: String) {
        self.speaker = speaker.map(str::to_string);
        self.full_text = text;
        self.revealed = 0;
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Revealed length in characters.
    pub fn revealed_len(&self) -> usize {
        self.revealed
    }

    pub fn full_len(&self) -> usize {
        self.full_text.chars().count()
    }

    pub fn revealed_text(&self) -> &str {
        match self.full_text.char_indices().nth(self.revealed) {
            Some((end, _)) => &self.full_text[..end],
            None => &self.full_text,
        }
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.revealed >= self.full_len()
    }

    pub(crate) fn reveal_one(&mut self) {
        if !self.is_fully_revealed() {
            self.revealed += 1;
        }
    }

    pub(crate) fn reveal_all(&mut self) {
        self.revealed = self.full_len();
    }

    pub fn playing(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Sound => self.sound.as_deref(),
            Channel::Music => self.music.as_deref(),
        }
    }

    pub(crate) fn set_playing(&mut self, channel: Channel, name: Option<&str>) {
        let name = name.map(str::to_string);
        match channel {
            Channel::Sound => self.sound = name,
            Channel::Music => self.music = name,
        }
    }
}
