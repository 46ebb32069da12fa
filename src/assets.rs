use crate::types::Rgb;
use serde::Serialize;

pub const DEFAULT_MOOD: &str = "default";

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Mood {
    pub name: String,
    pub image: String,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Character {
    pub name: String,
    pub color: Rgb,
    pub moods: Vec<Mood>,
}

impl Character {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            color: Rgb::WHITE,
            moods: Vec::new(),
        }
    }

    pub fn mood(&self, name: &str) -> Option<&Mood> {
        self.moods.iter().find(|mood| mood.name == name)
    }

    pub fn add_mood(&mut self, name: &str, image: &str) {
        self.moods.push(Mood {
            name: name.to_string(),
            image: image.to_string(),
        });
    }
}

/// A named file: background image, sound effect or music track.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Asset {
    pub name: String,
    pub location: String,
}

/// Everything the setup pass declared for the presentation layer. Lookups
/// return the first entry with a matching name.
#[derive(Debug, Default, Clone, Serialize)]
pub struct AssetRegistry {
    characters: Vec<Character>,
    backgrounds: Vec<Asset>,
    sounds: Vec<Asset>,
    music: Vec<Asset>,
}

fn find<'a>(assets: &'a [Asset], name: &str) -> Option<&'a Asset> {
    assets.iter().find(|asset| asset.name == name)
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if a character with that name already exists.
    pub fn create_character(&mut self, name: &str, mood: Option<(&str, &str)>) -> bool {
        if self.character(name).is_some() {
            return false;
        }
        let mut character = Character::new(name);
        if let Some((mood, image)) = mood {
            character.add_mood(mood, image);
        }
        self.characters.push(character);
        true
    }

    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|character| character.name == name)
    }

    pub fn character_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.characters.iter_mut().find(|character| character.name == name)
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn create_background(&mut self, name: &str, location: &str) {
        self.backgrounds.push(Asset {
            name: name.to_string(),
            location: location.to_string(),
        });
    }

    pub fn background(&self, name: &str) -> Option<&Asset> {
        find(&self.backgrounds, name)
    }

    pub fn backgrounds(&self) -> &[Asset] {
        &self.backgrounds
    }

    pub fn create_sound(&mut self, name: &str, location: &str) {
        self.sounds.push(Asset {
            name: name.to_string(),
            location: location.to_string(),
        });
    }

    pub fn sound(&self, name: &str) -> Option<&Asset> {
        find(&self.sounds, name)
    }

    pub fn sounds(&self) -> &[Asset] {
        &self.sounds
    }

    pub fn create_song(&mut self, name: &str, location: &str) {
        self.music.push(Asset {
            name: name.to_string(),
            location: location.to_string(),
        });
    }

    pub fn song(&self, name: &str) -> Option<&Asset> {
        find(&self.music, name)
    }

    pub fn music(&self) -> &[Asset] {
        &self.music
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_with_default_mood() {
        let mut assets = AssetRegistry::new();
        assert!(assets.create_character("Ana", Some((DEFAULT_MOOD, "a.png"))));
        assert!(!assets.create_character("Ana", None));
        let ana = assets.character("Ana").unwrap();
        assert_eq!(ana.mood("default").unwrap().image, "a.png");
        assert_eq!(ana.color, Rgb::WHITE);
    }

    #[test]
    fn test_first_registration_wins() {
        let mut assets = AssetRegistry::new();
        assets.create_background("forest", "one.png");
        assets.create_background("forest", "two.png");
        assert_eq!(assets.background("forest").unwrap().location, "one.png");
    }
}
