use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::foundation::error::{HostError, HostResult};

/// Largest frame edge the rasterizer can address.
pub const MAX_RASTER_DIMENSION: u32 = u16::MAX as u32;

/// Host configuration.
///
/// Loaded from JSON (every field optional) and then adjusted by `FRAMESCRIPT_*` environment
/// variables through [`HostConfig::with_env_overrides`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Extra directories scanned for font files before the system database.
    pub font_dirs: Vec<PathBuf>,
    /// Whether installed system fonts are available to text drawing.
    pub system_fonts: bool,
    /// Font applied to new frames, in `"<size>px <family>"` form.
    pub default_font: String,
    /// Upper bound for frame width and height, both delivered and script-constructed.
    pub max_frame_dimension: u32,
    /// Forward delivered frames unchanged when the script defines no hook.
    pub forward_unhandled: bool,
    /// Level used by `log(...)` calls that do not pass one.
    pub default_log_level: i32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            font_dirs: Vec::new(),
            system_fonts: true,
            default_font: "10px sans-serif".to_string(),
            max_frame_dimension: 8192,
            forward_unhandled: false,
            default_log_level: crate::host::log::LEVEL_DEBUG,
        }
    }
}

impl HostConfig {
    /// Parse configuration JSON from a reader.
    pub fn from_reader<R: Read>(r: R) -> HostResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| HostError::config(format!("parse host config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse configuration JSON from a string.
    pub fn from_json(s: &str) -> HostResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Read configuration JSON from a file.
    pub fn from_path(path: impl AsRef<Path>) -> HostResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            HostError::config(format!("open host config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Defaults adjusted by the process environment.
    pub fn from_env() -> HostResult<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `FRAMESCRIPT_*` overrides read through `lookup`.
    ///
    /// Unparseable values are ignored, matching how the rest of the host treats tuning knobs.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> HostResult<Self> {
        if let Some(dirs) = lookup("FRAMESCRIPT_FONT_DIRS") {
            self.font_dirs = std::env::split_paths(&dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(flag) = lookup("FRAMESCRIPT_SYSTEM_FONTS").and_then(|v| parse_flag(&v)) {
            self.system_fonts = flag;
        }
        if let Some(dim) = lookup("FRAMESCRIPT_MAX_FRAME_DIMENSION")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            self.max_frame_dimension = dim;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check field ranges.
    pub fn validate(&self) -> HostResult<()> {
        if self.max_frame_dimension == 0 || self.max_frame_dimension > MAX_RASTER_DIMENSION {
            return Err(HostError::config(format!(
                "max_frame_dimension must be in 1..={MAX_RASTER_DIMENSION}"
            )));
        }
        if crate::surface::FontSpec::parse(&self.default_font).is_none() {
            return Err(HostError::config(format!(
                "default_font '{}' is not of the form '<size>px <family>'",
                self.default_font
            )));
        }
        Ok(())
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
