//! Invalid values on disk or in memory fall back to their defaults.

use super::test_utils::{TestStore, DEFAULT_FILE};

#[test]
fn test_invalid_enumeration_value_is_repaired_on_open() {
    let fixture = TestStore::new();
    fixture.write_file("difficulty=nightmare\r\n");

    let store = fixture.open();

    assert_eq!(store.get("difficulty").unwrap(), "easy");
    assert_eq!(fixture.read_file(), DEFAULT_FILE);
}

#[test]
fn test_invalid_typed_values_are_repaired_on_open() {
    let fixture = TestStore::new();
    fixture.write_file(
        "server-port=12.5\r\nautosave=True\r\nworld-dir=world\r\ndifficulty=Hard\r\n",
    );

    let store = fixture.open();

    assert_eq!(store.get("server-port").unwrap(), "25565");
    assert_eq!(store.get("autosave").unwrap(), "true");
    assert_eq!(store.get("world-dir").unwrap(), "\"world\"");
    assert_eq!(store.get("difficulty").unwrap(), "easy");
    assert_eq!(fixture.read_file(), DEFAULT_FILE);
}

#[test]
fn test_valid_typed_values_survive() {
    let fixture = TestStore::new();
    fixture.write_file("server-port=-3\r\nautosave=false\r\nworld-dir=\"\"\r\n");

    let store = fixture.open();

    assert_eq!(store.get_int("server-port").unwrap(), -3);
    assert!(!store.get_bool("autosave").unwrap());
    assert_eq!(store.get_path("world-dir").unwrap(), std::path::PathBuf::new());
}

#[test]
fn test_invalid_set_is_persisted_until_next_get() {
    let fixture = TestStore::new();
    let store = fixture.open();

    store.set("server-port", "abc").unwrap();
    assert!(fixture.read_file().contains("server-port=abc\r\n"));

    assert_eq!(store.get("server-port").unwrap(), "25565");
    assert_eq!(fixture.read_file(), DEFAULT_FILE);
}

#[test]
fn test_invalid_set_is_repaired_on_reopen() {
    let fixture = TestStore::new();
    fixture.open().set("autosave", "1").unwrap();

    let store = fixture.open();

    assert_eq!(store.get("autosave").unwrap(), "true");
    assert_eq!(fixture.read_file(), DEFAULT_FILE);
}

#[test]
fn test_undecodable_line_does_not_abort_parse() {
    let fixture = TestStore::new();
    let mut content = b"difficulty=hard\n".to_vec();
    content.extend_from_slice(b"motd=\xc3\x28 broken\n");
    content.extend_from_slice(b"server-port=8080\n");
    std::fs::write(&fixture.path, content).unwrap();

    let store = fixture.open();

    assert_eq!(store.get("difficulty").unwrap(), "hard");
    assert_eq!(store.get("server-port").unwrap(), "8080");
    assert_eq!(store.get("motd").unwrap(), "A Minecraft Server");
}

#[test]
fn test_empty_value_is_repaired_for_constrained_keys_only() {
    let fixture = TestStore::new();
    fixture.write_file("difficulty=\r\nmotd=\r\n");

    let store = fixture.open();

    assert_eq!(store.get("difficulty").unwrap(), "easy");
    assert_eq!(store.get("motd").unwrap(), "");
}

#[test]
fn test_lone_carriage_return_line_endings_are_read() {
    let fixture = TestStore::new();
    fixture.write_file("difficulty=hard\rautosave=false\rserver-port=8080\r");

    let store = fixture.open();

    assert_eq!(store.get("difficulty").unwrap(), "hard");
    assert_eq!(store.get("autosave").unwrap(), "false");
    assert_eq!(store.get("server-port").unwrap(), "8080");
    let content = fixture.read_file();
    assert!(content.contains("difficulty=hard\r\n"));
    assert!(content.contains("autosave=false\r\n"));
}

#[test]
fn test_mixed_line_endings_are_read() {
    let fixture = TestStore::new();
    fixture.write_file("difficulty=normal\r\nautosave=false\rmotd=hi\n");

    let store = fixture.open();

    assert_eq!(store.get("difficulty").unwrap(), "normal");
    assert_eq!(store.get("autosave").unwrap(), "false");
    assert_eq!(store.get("motd").unwrap(), "hi");
}
