//! Shared fixtures for integration tests
//!
//! A small server-style schema covering every rule kind, rooted in a
//! temporary directory that lives as long as the fixture.

use mend::{ConfigStore, KeySpec, StaticSchema};
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestStore {
    // Held so the directory outlives the store.
    _temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestStore {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("server.cfg");
        Self {
            _temp_dir: temp_dir,
            path,
        }
    }

    pub fn schema(&self) -> StaticSchema {
        server_schema(self.path.clone())
    }

    pub fn open(&self) -> ConfigStore {
        ConfigStore::open(self.schema())
    }

    pub fn write_file(&self, content: &str) {
        std::fs::write(&self.path, content).unwrap();
    }

    pub fn read_file(&self) -> String {
        std::fs::read_to_string(&self.path).unwrap()
    }
}

pub fn server_schema(path: PathBuf) -> StaticSchema {
    StaticSchema::new(path)
        .with_key(
            KeySpec::new("server-port", "25565")
                .describe("TCP port the server listens on")
                .valid(&[":int:"]),
        )
        .with_key(
            KeySpec::new("difficulty", "easy")
                .describe("World difficulty\nTakes effect on restart")
                .valid(&["peaceful", "easy", "normal", "hard"]),
        )
        .with_key(KeySpec::new("autosave", "true").valid(&[":bool:"]))
        .with_key(
            KeySpec::new("world-dir", "\"world\"")
                .describe("Directory holding the world data")
                .valid(&[":path:"]),
        )
        .with_key(KeySpec::new("motd", "A Minecraft Server"))
}

/// Canonical file for `server_schema` with every key at its default.
pub const DEFAULT_FILE: &str = concat!(
    "autosave=true\r\n",
    "\r\n",
    "# World difficulty\r\n",
    "# Takes effect on restart\r\n",
    "#   Valid values: 'peaceful', 'easy', 'normal', 'hard'\r\n",
    "difficulty=easy\r\n",
    "\r\n",
    "motd=A Minecraft Server\r\n",
    "\r\n",
    "# TCP port the server listens on\r\n",
    "server-port=25565\r\n",
    "\r\n",
    "# Directory holding the world data\r\n",
    "world-dir=\"world\"\r\n",
    "\r\n",
);
