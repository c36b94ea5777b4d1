//! Transient forward-search highlights that fade out.
//!
//! The host drives [`HighlightFader::tick`] from a periodic timer every
//! [`HighlightFader::tick_interval`] and stops the timer once `tick` returns `false`.

use std::collections::BTreeMap;
use std::ops::Range;
use std::time::{Duration, Instant};

use crate::config::HighlightConfig;
use crate::edit::Edit;

/// Number of discrete alpha steps during the fade.
const FADE_STEPS: f32 = 20.0;

/// One highlighted range.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    /// Character range in the document.
    pub range: Range<usize>,
    /// Current alpha.
    pub alpha: f32,
    created: Instant,
}

/// Set of fading highlight regions of one document.
#[derive(Debug, Clone)]
pub struct HighlightFader {
    config: HighlightConfig,
    next_id: u64,
    regions: BTreeMap<u64, Highlight>,
}

impl HighlightFader {
    /// Create an empty fader.
    pub fn new(config: HighlightConfig) -> Self {
        Self {
            config,
            next_id: 0,
            regions: BTreeMap::new(),
        }
    }

    /// How often [`HighlightFader::tick`] should run while regions exist.
    pub fn tick_interval(&self) -> Duration {
        self.config.tick()
    }

    /// Add a region at full alpha.
    ///
    /// Returns `true` if the fader was idle, i.e. the host has to start ticking.
    pub fn add(&mut self, range: Range<usize>, now: Instant) -> bool {
        let was_idle = self.regions.is_empty();
        self.next_id += 1;
        self.regions.insert(
            self.next_id,
            Highlight {
                range,
                alpha: self.config.alpha,
                created: now,
            },
        );
        was_idle
    }

    /// Current regions, oldest first.
    pub fn regions(&self) -> impl Iterator<Item = &Highlight> + '_ {
        self.regions.values()
    }

    /// Returns `true` if no regions are left.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Advance every region to `now`: hold, then fade with a quantized cubic ease-out, then
    /// drop. Returns whether ticking must continue.
    pub fn tick(&mut self, now: Instant) -> bool {
        let hold = self.config.hold();
        let fade = self.config.fade();
        let full = self.config.alpha;

        self.regions.retain(|_, region| {
            let elapsed = now.saturating_duration_since(region.created);
            if elapsed <= hold {
                return true;
            }
            let faded = elapsed - hold;
            if faded > fade || fade.is_zero() {
                return false;
            }
            let remaining = 1.0 - faded.as_secs_f32() / fade.as_secs_f32();
            let steps = (ease_out(remaining) * FADE_STEPS).trunc();
            region.alpha = steps / FADE_STEPS * full;
            true
        });

        !self.regions.is_empty()
    }

    /// Shift regions after a buffer edit. Text inserted at a region's edges stays outside it.
    pub fn on_edit(&mut self, edit: &Edit) {
        for region in self.regions.values_mut() {
            let start = edit.map_offset(region.range.start, true);
            let end = edit.map_offset(region.range.end, false).max(start);
            region.range = start..end;
        }
    }
}

fn ease_out(x: f32) -> f32 {
    (x - 1.0).powi(3) + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn hold_fade_and_remove() {
        let mut fader = HighlightFader::new(HighlightConfig::default());
        let t0 = Instant::now();
        assert!(fader.add(3..8, t0));
        assert!(!fader.add(10..12, t0 + ms(100)));

        assert!(fader.tick(t0 + ms(1500)));
        assert!(fader.regions().all(|r| (r.alpha - 0.6).abs() < 1e-6));

        assert!(fader.tick(t0 + ms(1625)));
        let first = fader.regions().next().unwrap();
        // ease(0.5) = 0.875 -> 17 steps of 0.03
        assert!((first.alpha - 0.51).abs() < 1e-4);

        assert!(fader.tick(t0 + ms(1800)));
        assert_eq!(fader.regions().count(), 1);
        assert!(!fader.tick(t0 + ms(1900)));
        assert!(fader.is_empty());
    }

    #[test]
    fn regions_follow_edits() {
        let mut fader = HighlightFader::new(HighlightConfig::default());
        fader.add(5..10, Instant::now());
        fader.on_edit(&Edit::Insert {
            offset: 5,
            text: "ab".to_string(),
        });
        assert_eq!(fader.regions().next().unwrap().range, 7..12);
        fader.on_edit(&Edit::Insert {
            offset: 12,
            text: "z".to_string(),
        });
        assert_eq!(fader.regions().next().unwrap().range, 7..12);
        fader.on_edit(&Edit::Delete {
            offset: 0,
            deleted: "x".repeat(9),
        });
        assert_eq!(fader.regions().next().unwrap().range, 0..3);
    }

    #[test]
    fn tick_interval_from_config() {
        let fader = HighlightFader::new(HighlightConfig::default());
        assert_eq!(fader.tick_interval(), ms(15));
    }
}
