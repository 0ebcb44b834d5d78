//! Stored trace/pitch defaults
//!
//! The preferences file is plain text with one `Key = value` line per
//! setting, values in centimils:
//!
//! ```text
//! ComponentTrace = 700
//! ComponentPitch = 4500
//! SolderTrace = 700
//! SolderPitch = 7000
//! DefaultAction = 1
//! ```
//!
//! Reading is lenient: a key's value is the first signed integer after the
//! key, and anything missing falls back to its default. File errors are
//! logged and never stop a run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Location of the preferences file below the home directory
const PREFS_RELATIVE_PATH: &str = ".pcb/stipple_prefs";

/// Trace and pitch defaults in centimils
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StippleDefaults {
    pub component_trace: i64,
    pub component_pitch: i64,
    pub solder_trace: i64,
    pub solder_pitch: i64,
}

impl Default for StippleDefaults {
    fn default() -> Self {
        Self {
            component_trace: 700,
            component_pitch: 4500,
            solder_trace: 700,
            solder_pitch: 7000,
        }
    }
}

/// First signed integer following `key` in `text`
fn read_value(text: &str, key: &str) -> Option<i64> {
    let rest = &text[text.find(key)? + key.len()..];
    let start = rest.find(|c: char| c == '-' || c.is_ascii_digit())?;
    let digits: String = rest[start..]
        .chars()
        .take_while(|c| *c == '-' || c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

impl StippleDefaults {
    /// Parse preference text, defaulting every key that is missing or garbled
    pub fn parse(text: &str) -> Self {
        let defaults = Self::default();
        Self {
            component_trace: read_value(text, "ComponentTrace").unwrap_or(defaults.component_trace),
            component_pitch: read_value(text, "ComponentPitch").unwrap_or(defaults.component_pitch),
            solder_trace: read_value(text, "SolderTrace").unwrap_or(defaults.solder_trace),
            solder_pitch: read_value(text, "SolderPitch").unwrap_or(defaults.solder_pitch),
        }
    }

    pub fn to_prefs_string(&self) -> String {
        format!(
            "ComponentTrace = {}\nComponentPitch = {}\nSolderTrace = {}\nSolderPitch = {}\nDefaultAction = 1\n",
            self.component_trace, self.component_pitch, self.solder_trace, self.solder_pitch
        )
    }

    /// Write the preferences file, creating its directory if needed
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_prefs_string())
    }

    /// Save, logging instead of failing
    pub fn store(&self, path: &Path) {
        if let Err(e) = self.save(path) {
            warn!(path = %path.display(), error = %e, "Unable to write prefs file");
        }
    }

    /// Read the preferences file, writing the defaults when it is missing
    pub fn load_or_create(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "Read prefs file");
                Self::parse(&text)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unable to read prefs file");
                let defaults = Self::default();
                defaults.store(path);
                defaults
            }
        }
    }
}

/// `$HOME/.pcb/stipple_prefs`, when a home directory is known
pub fn default_prefs_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(PREFS_RELATIVE_PATH))
}
