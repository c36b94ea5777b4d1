//! Host-provided settings.
//!
//! Configuration is passed explicitly to the objects that need it; there is no process-wide
//! settings registry. Every section falls back to its defaults when omitted, so a host can
//! supply a partial JSON document.

use serde::Deserialize;
use std::time::Duration;

use crate::error::ConfigError;

/// Editing preferences that affect derived text regions and snippet insertion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditingConfig {
    /// Width of a tab stop in columns.
    pub tab_width: usize,
    /// Replace tabs with `tab_width` spaces in inserted snippets.
    pub spaces_instead_of_tabs: bool,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            spaces_instead_of_tabs: false,
        }
    }
}

/// Geometry of the outline view, used for sizing and hit-testing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Height of one outline row.
    pub row_height: u32,
    /// Fixed extra height added to a non-empty outline.
    pub margin: u32,
    /// Offset of the first row from the top of the view.
    pub top_padding: u32,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            row_height: 24,
            margin: 33,
            top_padding: 9,
        }
    }
}

/// Timing of transient forward-search highlights.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// How long a highlight stays at full strength (milliseconds).
    pub hold_ms: u64,
    /// How long the fade-out lasts (milliseconds).
    pub fade_ms: u64,
    /// Interval between fade ticks (milliseconds).
    pub tick_ms: u64,
    /// Alpha of a highlight at full strength.
    pub alpha: f32,
}

impl HighlightConfig {
    /// Hold duration.
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }

    /// Fade duration.
    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    /// Tick interval the host timer should use.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            hold_ms: 1500,
            fade_ms: 250,
            tick_ms: 15,
            alpha: 0.6,
        }
    }
}

/// All settings consumed by the core.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Editing preferences.
    pub editing: EditingConfig,
    /// Outline view geometry.
    pub outline: OutlineConfig,
    /// Forward-search highlight timing.
    pub highlight: HighlightConfig,
}

impl CoreConfig {
    /// Parse a (possibly partial) JSON settings document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
