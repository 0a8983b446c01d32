use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use super::*;
use crate::constants::MAX_QUEUE_NOTES;
use crate::Error;
use crate::SizeError;

#[test]
#[serial]
fn defaults_when_no_file_given() {
    let settings = Settings::load(None).unwrap();
    assert_eq!(settings.queue.default_note_capacity, 32);
    assert_eq!(settings.queue.max_note_capacity, MAX_QUEUE_NOTES);
}

#[test]
#[serial]
fn file_overrides_defaults() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(file, "[queue]\ndefault_note_capacity = 8\nmax_note_capacity = 64").unwrap();

    let settings = Settings::load(Some(file.path().to_str().unwrap())).unwrap();
    assert_eq!(settings.queue.default_note_capacity, 8);
    assert_eq!(settings.queue.max_note_capacity, 64);
}

#[test]
#[serial]
fn environment_overrides_file() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(file, "[queue]\ndefault_note_capacity = 8").unwrap();

    std::env::set_var("WATCHQ_QUEUE__DEFAULT_NOTE_CAPACITY", "16");
    let settings = Settings::load(Some(file.path().to_str().unwrap()));
    std::env::remove_var("WATCHQ_QUEUE__DEFAULT_NOTE_CAPACITY");

    assert_eq!(settings.unwrap().queue.default_note_capacity, 16);
}

#[test]
#[serial]
fn invalid_capacity_in_file_is_rejected() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(file, "[queue]\ndefault_note_capacity = 7").unwrap();

    let err = Settings::load(Some(file.path().to_str().unwrap())).unwrap_err();
    assert!(matches!(err, Error::Size(SizeError::NotPowerOfTwo { requested: 7 })));
}

#[test]
fn validate_rejects_default_above_max() {
    let config = QueueConfig {
        default_note_capacity: 128,
        max_note_capacity: 64,
    };
    assert!(matches!(
        config.validate(),
        Err(Error::Size(SizeError::ExceedsLimit { requested: 128, limit: 64 }))
    ));
}

#[test]
fn validate_caps_at_engine_hard_maximum() {
    let config = QueueConfig {
        default_note_capacity: 1024,
        max_note_capacity: 4096,
    };
    assert!(matches!(
        config.validate(),
        Err(Error::Size(SizeError::ExceedsLimit { limit: MAX_QUEUE_NOTES, .. }))
    ));
}
