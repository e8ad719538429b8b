//! Stored client configuration.
//!
//! Credentials can be kept in an INI-style file at `~/.bridgeConfig`:
//!
//! ```ini
//! [authentication]
//! email = someone@example.org
//! password = hunter2
//! ```
//!
//! The file is optional. A missing file or section reads as an empty mapping.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::api::BridgeError;

/// Config file name in the user's home directory
const CONFIG_FILE: &str = ".bridgeConfig";

/// Section whose entries are visible in every other section
const DEFAULT_SECTION: &str = "DEFAULT";

/// Section holding stored credentials
pub const AUTH_SECTION: &str = "authentication";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: Option<PathBuf>,
}

impl Default for ConfigStore {
    /// Store backed by `~/.bridgeConfig`
    fn default() -> Self {
        Self {
            path: dirs::home_dir().map(|home| home.join(CONFIG_FILE)),
        }
    }
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Entries of one section, keyed by lower-cased option name.
    ///
    /// Values are interpolated: `%%` is a literal `%` and `%(name)s` expands
    /// to another option of the same section or of `[DEFAULT]`.
    /// The file is read on every call.
    pub fn section(&self, name: &str) -> Result<HashMap<String, String>, BridgeError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(HashMap::new());
        };

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file");
                return Ok(HashMap::new());
            }
            Err(source) => {
                return Err(BridgeError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let parse_error = |(line, message)| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            line,
            message,
        };

        let mut sections = parse_ini(&contents).map_err(parse_error)?;

        let mut raw = sections.remove(DEFAULT_SECTION).unwrap_or_default();
        match sections.remove(name) {
            Some(own) => raw.extend(own),
            None if name != DEFAULT_SECTION => return Ok(HashMap::new()),
            None => {}
        }

        raw.iter()
            .map(|(key, entry)| {
                interpolate(&entry.value, &raw, 1)
                    .map(|value| (key.clone(), value))
                    .map_err(|message| parse_error((entry.line, message)))
            })
            .collect()
    }
}

/// Raw option value and the line it started on
#[derive(Debug, Clone)]
struct RawEntry {
    value: String,
    line: usize,
}

type Sections = HashMap<String, HashMap<String, RawEntry>>;

/// Nesting limit for `%(name)s` references
const MAX_INTERPOLATION_DEPTH: usize = 10;

/// Expand `%%` and `%(name)s` in `value` using the section's raw entries
fn interpolate(
    value: &str,
    entries: &HashMap<String, RawEntry>,
    depth: usize,
) -> Result<String, String> {
    if depth > MAX_INTERPOLATION_DEPTH {
        return Err(format!("interpolation nested deeper than {MAX_INTERPOLATION_DEPTH} levels"));
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(p) = rest.find('%') {
        out.push_str(&rest[..p]);
        rest = &rest[p..];

        if let Some(after) = rest.strip_prefix("%%") {
            out.push('%');
            rest = after;
        } else if let Some(after) = rest.strip_prefix("%(") {
            let reference = after
                .find(")s")
                .map(|end| &after[..end])
                .filter(|name| !name.is_empty() && !name.contains(')'));
            let Some(name) = reference else {
                return Err(format!("bad interpolation variable reference: {rest}"));
            };
            let Some(target) = entries.get(&name.to_lowercase()) else {
                return Err(format!("interpolation references missing option '{name}'"));
            };
            if target.value.contains('%') {
                out.push_str(&interpolate(&target.value, entries, depth + 1)?);
            } else {
                out.push_str(&target.value);
            }
            rest = &after[name.len() + 2..];
        } else {
            return Err(format!("'%' must be followed by '%' or '(', found: {rest}"));
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Parse INI text into sections. Errors carry a 1-based line number.
fn parse_ini(contents: &str) -> Result<Sections, (usize, String)> {
    let mut sections = Sections::new();
    let mut current: Option<String> = None;
    // Option the next indented line continues
    let mut last_key: Option<String> = None;
    // Blank lines seen since last_key's latest line
    let mut pending_blank = 0;

    for (idx, raw) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            pending_blank += 1;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = raw.starts_with(|c: char| c.is_whitespace());
        if indented {
            if let (Some(section), Some(key)) = (&current, &last_key) {
                if let Some(entry) = sections.get_mut(section).and_then(|s| s.get_mut(key)) {
                    for _ in 0..pending_blank {
                        entry.value.push('\n');
                    }
                    entry.value.push('\n');
                    entry.value.push_str(trimmed);
                }
                pending_blank = 0;
                continue;
            }
        }
        pending_blank = 0;

        if trimmed.starts_with('[') {
            let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
                return Err((line_no, format!("unterminated section header: {trimmed}")));
            };
            if sections.contains_key(name) {
                return Err((line_no, format!("section '{name}' already exists")));
            }
            sections.insert(name.to_string(), HashMap::new());
            current = Some(name.to_string());
            last_key = None;
            continue;
        }

        let Some(section) = &current else {
            return Err((line_no, "file contains no section headers".to_string()));
        };

        let Some(split) = trimmed.find(['=', ':']) else {
            return Err((line_no, format!("expected 'key = value', found: {trimmed}")));
        };
        let key = trimmed[..split].trim().to_lowercase();
        let value = trimmed[split + 1..].trim().to_string();
        if key.is_empty() {
            return Err((line_no, "option name is empty".to_string()));
        }

        let entries = sections.entry(section.clone()).or_default();
        if entries.contains_key(&key) {
            return Err((line_no, format!("option '{key}' in section '{section}' already exists")));
        }
        entries.insert(key.clone(), RawEntry { value, line: line_no });
        last_key = Some(key);
    }

    Ok(sections)
}
