// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration loaded by applications before opening a render window.
//!
//! The configuration is plain data deserialised from RON. Every field has a
//! default so a partial file (or no file at all) is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Settings of the graphics context requested from (and reported by) a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Major version of the native API.
    pub major_version: u32,
    /// Minor version of the native API.
    pub minor_version: u32,
    /// Bits of the depth buffer.
    pub depth_bits: u8,
    /// Bits of the stencil buffer.
    pub stencil_bits: u8,
    /// Number of MSAA samples, `0` or `1` for none.
    pub msaa_samples: u8,
    /// Whether the core profile was requested.
    pub core_profile: bool,
    /// Whether native debug output should be routed to the log.
    pub debug: bool,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            major_version: 4,
            minor_version: 5,
            depth_bits: 24,
            stencil_bits: 8,
            msaa_samples: 0,
            core_profile: true,
            debug: cfg!(debug_assertions),
        }
    }
}

impl ContextSettings {
    /// Packs the version as `major * 100 + minor * 10`, e.g. `450` for 4.5.
    pub fn packed_version(&self) -> u32 {
        self.major_version * 100 + self.minor_version * 10
    }
}

/// Window-related settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title.
    pub title: String,
    /// Inner width in physical pixels.
    pub width: u32,
    /// Inner height in physical pixels.
    pub height: u32,
    /// Whether buffer swaps wait for vertical sync.
    pub vsync: bool,
    /// Whether the window is created borderless fullscreen.
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "hd".to_owned(),
            width: 1280,
            height: 720,
            vsync: true,
            fullscreen: false,
        }
    }
}

/// Top-level render configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// The window to open.
    pub window: WindowConfig,
    /// The graphics context to request for it.
    pub context: ContextSettings,
}

/// An error raised while loading a [`RenderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration text is not valid RON for `RenderConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The configuration parsed but holds an unusable value.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl RenderConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Loaded render config from '{}'", path.display());
        Self::from_ron_str(&text)
    }

    /// Checks the values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.context.major_version == 0 {
            return Err(ConfigError::Invalid(
                "context major version must be non-zero".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_struct_yields_defaults() {
        let config = RenderConfig::from_ron_str("()").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.context.packed_version(), 450);
    }

    #[test]
    fn partial_config_overrides_fields() {
        let text = r#"(
            window: (title: "demo", width: 640),
            context: (major_version: 3, minor_version: 3, msaa_samples: 4),
        )"#;
        let config = RenderConfig::from_ron_str(text).unwrap();
        assert_eq!(config.window.title, "demo");
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.context.packed_version(), 330);
        assert_eq!(config.context.msaa_samples, 4);
    }

    #[test]
    fn zero_window_size_is_rejected() {
        let err = RenderConfig::from_ron_str("(window: (width: 0))").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let err = RenderConfig::from_ron_str("(window: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(window: (title: \"from disk\"))").unwrap();
        let config = RenderConfig::load(file.path()).unwrap();
        assert_eq!(config.window.title, "from disk");

        let missing = RenderConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
