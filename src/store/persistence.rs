//! Persistence layer for the config store
//!
//! Reading merges recognized lines from disk into the current values.
//! Writing renders the canonical form and replaces the whole file.

use crate::error::StoreError;
use crate::format::{self, Line};
use crate::schema::SchemaProvider;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Opens the writable text stream a store serializes into
pub trait FileOpener: Send + Sync {
    /// Open a stream whose content replaces `path`. The write counts as
    /// complete once `flush` succeeds.
    fn open_for_write(&self, path: &Path) -> io::Result<Box<dyn Write + Send>>;
}

/// Filesystem-backed [`FileOpener`]
///
/// Creates missing parent directories and writes to a temporary sibling
/// file, which replaces the target when the stream is flushed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsOpener;

impl FileOpener for FsOpener {
    fn open_for_write(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Box::new(AtomicFile::create(path)?))
    }
}

/// Temporary file renamed onto its target on `flush`
///
/// Dropped without a successful flush, the temporary file is removed and the
/// target is left untouched.
struct AtomicFile {
    target: PathBuf,
    temp_path: PathBuf,
    writer: BufWriter<fs::File>,
    committed: bool,
}

impl AtomicFile {
    fn create(target: &Path) -> io::Result<Self> {
        let temp_path = temp_path_for(target);
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(Self {
            target: target.to_path_buf(),
            temp_path,
            writer: BufWriter::new(file),
            committed: false,
        })
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        if !self.committed {
            self.writer.get_ref().sync_all()?;
            fs::rename(&self.temp_path, &self.target)?;
            self.committed = true;
        }
        Ok(())
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

/// `server.cfg` -> `server.cfg.tmp`, in the same directory.
fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Split on `\r\n`, `\n` or a lone `\r`.
fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < content.len() {
        match content[i] {
            b'\n' => {
                lines.push(&content[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&content[start..i]);
                if content.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < content.len() {
        lines.push(&content[start..]);
    }
    lines
}

/// Merge every recognized `key=value` line of `content` into `values`.
///
/// Unknown keys are dropped, invalid values fall back to `defaults`. A line
/// that cannot be decoded is logged and skipped. Only a key missing from
/// `defaults` aborts the merge.
pub fn merge(
    content: &[u8],
    values: &mut BTreeMap<String, String>,
    defaults: &HashMap<String, String>,
    schema: &dyn SchemaProvider,
) -> Result<(), StoreError> {
    for (index, raw) in split_lines(content).into_iter().enumerate() {
        let line_no = index + 1;
        let text = match std::str::from_utf8(raw) {
            Ok(text) => text,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping undecodable config line");
                continue;
            }
        };

        let (key, value) = match format::parse_line(text) {
            Line::Entry { key, value } => (key, value),
            Line::Comment | Line::NoSeparator => continue,
        };

        let Some(slot) = values.get_mut(key) else {
            debug!(line = line_no, key, "Dropping unknown config key");
            continue;
        };

        if schema.valid_values(key).accepts(value) {
            *slot = value.to_string();
        } else {
            let default = defaults
                .get(key)
                .ok_or_else(|| StoreError::MissingDefault(key.to_string()))?;
            info!(
                line = line_no,
                key,
                value,
                default = %default,
                "Invalid config value, using default"
            );
            *slot = default.clone();
        }
    }
    Ok(())
}

/// Read `path` and merge it into `values`.
///
/// A missing file is expected and leaves `values` untouched. Other read
/// failures are logged and treated the same way.
pub fn read_and_merge(
    path: &Path,
    values: &mut BTreeMap<String, String>,
    defaults: &HashMap<String, String>,
    schema: &dyn SchemaProvider,
) -> Result<(), StoreError> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(());
        }
        Err(e) => {
            let err = StoreError::Io {
                path: path.to_path_buf(),
                source: e,
            };
            warn!(error = %err, "Unable to read config file, using defaults");
            return Ok(());
        }
    };
    merge(&content, values, defaults, schema)
}

/// Render the canonical file content for `values`, keys in lexicographic order.
pub fn render(values: &BTreeMap<String, String>, schema: &dyn SchemaProvider) -> String {
    let mut out = String::new();
    for (key, value) in values {
        let description = schema.description(key);
        let rule = schema.valid_values(key);
        format::render_entry(&mut out, key, value, description.as_deref(), &rule);
    }
    out
}

/// Replace the file at `path` with the canonical form of `values`.
///
/// Failures are logged, never returned: the in-memory state stays
/// authoritative. With [`FsOpener`] a failed write leaves the previous file
/// in place.
/// Returns whether the write completed.
pub fn write_to_file(
    path: &Path,
    values: &BTreeMap<String, String>,
    schema: &dyn SchemaProvider,
    opener: &dyn FileOpener,
) -> bool {
    let mut stream = match opener.open_for_write(path) {
        Ok(stream) => stream,
        Err(e) => {
            let err = StoreError::Io {
                path: path.to_path_buf(),
                source: e,
            };
            error!(error = %err, "Unable to write config to file");
            return false;
        }
    };

    let content = render(values, schema);
    if let Err(e) = stream.write_all(content.as_bytes()) {
        let err = StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        error!(error = %err, "Config write failed part way");
        return false;
    }

    if let Err(e) = stream.flush() {
        let err = StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        warn!(error = %err, "Failed to close config file");
        return false;
    }

    debug!(path = %path.display(), keys = values.len(), "Config written");
    true
}
