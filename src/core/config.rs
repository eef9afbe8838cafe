use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::simd::{Kernel, UnknownKernel};

/// Environment variable that overrides `codec.kernel`.
pub const KERNEL_ENV: &str = "VBASE64_KERNEL";

/// Errors raised while loading settings or resolving the kernel.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    UnknownKernel(#[from] UnknownKernel),

    #[error("kernel '{0}' is not supported on this CPU")]
    KernelUnavailable(String),
}

/// Codec defaults applied by the CLI.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CodecSettings {
    /// Kernel name, or `auto` for the best one this CPU supports.
    pub kernel: String,
    /// Append `\n` after encoded output.
    pub newline: bool,
    /// Strict decoding.
    pub strict: bool,
    /// Line width for wrapped output, 0 for none.
    pub wrap: usize,
}

/// Parameters for `vbase64 bench`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BenchSettings {
    pub sizes: Vec<usize>,
    pub iterations: usize,
    pub warmup: usize,
    /// Target duration of one measurement in milliseconds.
    pub target_ms: u64,
}

/// Global settings for vbase64.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub codec: CodecSettings,
    pub bench: BenchSettings,
}

/// A partial settings file: every field is optional and only the ones
/// present override the layer below.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SettingsFile {
    pub codec: CodecOverrides,
    pub bench: BenchOverrides,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CodecOverrides {
    pub kernel: Option<String>,
    pub newline: Option<bool>,
    pub strict: Option<bool>,
    pub wrap: Option<usize>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BenchOverrides {
    pub sizes: Option<Vec<usize>>,
    pub iterations: Option<usize>,
    pub warmup: Option<usize>,
    pub target_ms: Option<u64>,
}

impl SettingsFile {
    /// Parses a (possibly partial) settings file from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads a settings file from a path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            origin: path.display().to_string(),
            source,
        })
    }
}

impl Settings {
    /// Parses complete settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the built-in settings bundled with the library.
    pub fn load_default() -> Result<Self, ConfigError> {
        let content = include_str!("../../defaults.toml");
        Self::from_toml(content).map_err(|source| ConfigError::Parse {
            origin: "built-in defaults".to_string(),
            source,
        })
    }

    /// Loads settings with user overrides from standard locations.
    ///
    /// Layers in priority order (later wins):
    /// 1. Built-in defaults
    /// 2. `~/.config/vbase64/config.toml`
    /// 3. `./vbase64.toml`
    /// 4. `explicit` (tilde-expanded), if given
    /// 5. `VBASE64_KERNEL`
    ///
    /// Broken files in the standard locations are skipped with a warning; an
    /// explicit file that cannot be loaded is an error.
    pub fn load_with_overrides(explicit: Option<&str>) -> Result<Self, ConfigError> {
        let mut settings = Self::load_default()?;

        if let Some(config_dir) = dirs::config_dir() {
            let user_config_path = config_dir.join("vbase64").join("config.toml");
            settings.merge_optional(&user_config_path);
        }

        settings.merge_optional(Path::new("vbase64.toml"));

        if let Some(path) = explicit {
            settings.merge_explicit(path)?;
        }

        settings.apply_kernel_override(std::env::var(KERNEL_ENV).ok());
        Ok(settings)
    }

    /// Merge a file the user named; unlike the standard locations, a missing
    /// or broken file is an error.
    pub fn merge_explicit(&mut self, path: &str) -> Result<(), ConfigError> {
        let expanded = shellexpand::tilde(path);
        let file = SettingsFile::load_from_file(Path::new(expanded.as_ref()))?;
        log::debug!("loaded settings from {}", expanded);
        self.merge(file);
        Ok(())
    }

    fn merge_optional(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match SettingsFile::load_from_file(path) {
            Ok(file) => {
                log::debug!("loaded settings from {}", path.display());
                self.merge(file);
            }
            Err(e) => log::warn!("ignoring settings file: {}", e),
        }
    }

    /// Merges a partial settings file into this one.
    pub fn merge(&mut self, other: SettingsFile) {
        let SettingsFile { codec, bench } = other;
        if let Some(kernel) = codec.kernel {
            self.codec.kernel = kernel;
        }
        if let Some(newline) = codec.newline {
            self.codec.newline = newline;
        }
        if let Some(strict) = codec.strict {
            self.codec.strict = strict;
        }
        if let Some(wrap) = codec.wrap {
            self.codec.wrap = wrap;
        }
        if let Some(sizes) = bench.sizes {
            self.bench.sizes = sizes;
        }
        if let Some(iterations) = bench.iterations {
            self.bench.iterations = iterations;
        }
        if let Some(warmup) = bench.warmup {
            self.bench.warmup = warmup;
        }
        if let Some(target_ms) = bench.target_ms {
            self.bench.target_ms = target_ms;
        }
    }

    /// Replace the kernel name when `value` is set and non-empty.
    pub fn apply_kernel_override(&mut self, value: Option<String>) {
        if let Some(kernel) = value.filter(|v| !v.trim().is_empty()) {
            log::debug!("{} overrides kernel with '{}'", KERNEL_ENV, kernel);
            self.codec.kernel = kernel.trim().to_string();
        }
    }

    /// Resolve `codec.kernel` to a kernel this CPU can run.
    pub fn kernel(&self) -> Result<Kernel, ConfigError> {
        let kernel: Kernel = self.codec.kernel.parse()?;
        if !kernel.is_available() {
            return Err(ConfigError::KernelUnavailable(self.codec.kernel.clone()));
        }
        Ok(kernel)
    }
}
