mod common;
use common::*;
use vnscript::environment::DEFAULT_BACKGROUND;
use vnscript::types::{Channel, ChannelSelection, ClearTarget, StagePosition};
use vnscript::{Directive, RuntimeError, ScriptWarning, State};

#[test]
fn test_sound_effect_wins_name_collision() {
    let mut r = load(
        "sound bell \"bell.wav\"\nmusic bell \"bell.ogg\"\nmusic theme \"theme.ogg\"\nplay bell\nplay theme 0.5 repeat\nPC \"x\"",
    );
    let directives = r.start().unwrap();
    assert_eq!(
        directives[..2],
        [
            Directive::PlaySound {
                name: "bell".to_string(),
                location: "bell.wav".to_string(),
                channel: Channel::Sound,
                volume: 1.0,
                repeat: false,
            },
            Directive::PlaySound {
                name: "theme".to_string(),
                location: "theme.ogg".to_string(),
                channel: Channel::Music,
                volume: 0.5,
                repeat: true,
            },
        ]
    );
    assert_eq!(r.environment().playing(Channel::Sound), Some("bell"));
    assert_eq!(r.environment().playing(Channel::Music), Some("theme"));
}

#[test]
fn test_repeat_short_flag() {
    let mut r = load("music theme \"theme.ogg\"\nplay theme r\nPC \"x\"");
    let directives = r.start().unwrap();
    assert!(matches!(
        directives[0],
        Directive::PlaySound { repeat: true, volume, .. } if volume == 1.0
    ));
}

#[test]
fn test_stop_channels() {
    let mut r = load(
        "sound bell \"bell.wav\"\nmusic theme \"theme.ogg\"\nplay bell\nplay theme\nstop music\nPC \"x\"\nstop\nPC \"y\"",
    );
    let directives = r.start().unwrap();
    assert_eq!(
        directives[2],
        Directive::StopChannel {
            channel: ChannelSelection::One(Channel::Music)
        }
    );
    assert_eq!(r.environment().playing(Channel::Sound), Some("bell"));
    assert_eq!(r.environment().playing(Channel::Music), None);

    r.skip();
    let directives = r.advance().unwrap();
    assert_eq!(
        directives[0],
        Directive::StopChannel {
            channel: ChannelSelection::Both
        }
    );
    assert_eq!(r.environment().playing(Channel::Sound), None);
}

#[test]
fn test_clear_one_slot_or_all() {
    let mut r = load(
        "character Ana \"a.png\"\nshow Ana default left\nshow Ana default right\nclear left\nclear\nPC \"x\"",
    );
    let directives = r.start().unwrap();
    assert_eq!(
        directives[2..4],
        [
            Directive::ClearSlot {
                target: ClearTarget::Slot(StagePosition::Left)
            },
            Directive::ClearSlot {
                target: ClearTarget::All
            },
        ]
    );
    for position in StagePosition::ALL {
        assert!(r.environment().slot(position).is_none());
    }
}

#[test]
fn test_unknown_position_clears_everything() {
    let mut r = load("clear middle\nPC \"x\"");
    let directives = r.start().unwrap();
    assert_eq!(
        directives[0],
        Directive::ClearSlot {
            target: ClearTarget::All
        }
    );
}

#[test]
fn test_pause_marker_suspends() {
    let mut r = load("sound bell \"bell.wav\"\nplay bell pause\nPC \"x\"");
    let directives = r.start().unwrap();
    assert_eq!(directives.len(), 1);
    assert!(matches!(
        directives[0],
        Directive::PlaySound { volume, repeat: false, .. } if volume == 1.0
    ));
    assert_eq!(r.state(), &State::AwaitingAdvance);
    assert_eq!(texts(&r.advance().unwrap()), vec!["\"x\""]);
}

#[test]
fn test_backgrounds() {
    let mut r = load("image forest \"forest.png\"\nshow forest\nshow cave\nPC \"x\"");
    assert_eq!(r.environment().background(), DEFAULT_BACKGROUND);
    let directives = r.start().unwrap();
    assert_eq!(
        directives[0],
        Directive::ShowBackground {
            name: "forest".to_string(),
            image: "forest.png".to_string()
        }
    );
    assert_eq!(r.environment().background(), "forest");
    assert_eq!(
        r.take_warnings(),
        vec![ScriptWarning::UnknownAsset {
            line: 2,
            what: "background",
            name: "cave".to_string()
        }]
    );
}

#[test]
fn test_character_moods_and_positions() {
    let mut r = load(
        "character Ana happy \"a_happy.png\"\nimage Ana sad \"a_sad.png\"\nshow Ana sad right\nshow Ana angry\nPC \"x\"",
    );
    let directives = r.start().unwrap();
    assert_eq!(
        directives[0],
        Directive::ShowCharacter {
            name: "Ana".to_string(),
            mood: "sad".to_string(),
            image: "a_sad.png".to_string(),
            position: StagePosition::Right,
        }
    );
    assert_eq!(directives.len(), 2);
    let staged = r.environment().slot(StagePosition::Right).unwrap();
    assert_eq!(staged.mood, "sad");
}

#[test]
fn test_negative_volume_falls_back_to_full() {
    let mut r = load("sound bell \"bell.wav\"\nplay bell -1\nPC \"x\"");
    let directives = r.start().unwrap();
    assert!(matches!(
        directives[0],
        Directive::PlaySound { volume, .. } if volume == 1.0
    ));
    assert_eq!(
        r.take_warnings(),
        vec![ScriptWarning::MalformedNumber {
            line: 1,
            value: "-1".to_string()
        }]
    );
}

#[test]
fn test_directives_before_a_failed_jump_are_delivered() {
    let mut r = load("image forest \"f.png\"\nshow forest\njump nowhere\nPC \"x\"");
    assert_eq!(
        r.start(),
        Err(RuntimeError::UnknownLabel {
            label: "nowhere".to_string(),
            line: 2
        })
    );
    assert_eq!(r.environment().background(), "forest");
    let directives = r.advance().unwrap();
    assert_eq!(
        directives[0],
        Directive::ShowBackground {
            name: "forest".to_string(),
            image: "f.png".to_string()
        }
    );
    assert_eq!(texts(&directives), vec!["\"x\""]);
}
