//! Bridge between cluster output and whatever draws markers.
//!
//! [`DisplayState`] tracks what is on screen and turns each new pass into
//! show/hide calls on a [`MarkerRenderer`]. Markers are matched by
//! [`MarkerId`]: one that keeps its identity across passes stays on screen
//! untouched, the rest are hidden or shown.

use crate::marker::{DisplayMarker, Marker, MarkerId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Receives display updates. Implemented by the host's map layer.
pub trait MarkerRenderer<M> {
    fn show(&mut self, marker: &DisplayMarker<M>);
    fn hide(&mut self, marker: &DisplayMarker<M>);
}

/// Renderer that only records identities, for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub shown: Vec<MarkerId>,
    pub hidden: Vec<MarkerId>,
}

impl<M: Marker> MarkerRenderer<M> for RecordingRenderer {
    fn show(&mut self, marker: &DisplayMarker<M>) {
        self.shown.push(marker.identity());
    }

    fn hide(&mut self, marker: &DisplayMarker<M>) {
        self.hidden.push(marker.identity());
    }
}

/// Counts from one [`DisplayState::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarkerDiff {
    pub kept: usize,
    pub added: usize,
    pub removed: usize,
}

/// Markers currently on screen.
#[derive(Debug, Clone)]
pub struct DisplayState<M> {
    displayed: Vec<DisplayMarker<M>>,
}

impl<M: Marker> DisplayState<M> {
    pub fn new() -> Self {
        Self {
            displayed: Vec::new(),
        }
    }

    pub fn displayed(&self) -> &[DisplayMarker<M>] {
        &self.displayed
    }

    pub fn len(&self) -> usize {
        self.displayed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displayed.is_empty()
    }

    /// Replace the displayed set with `next`.
    ///
    /// Each displayed marker is paired with at most one unclaimed marker of
    /// `next` sharing its identity. Paired markers stay as they are; unpaired
    /// ones from `next` are shown and the remaining old ones hidden.
    pub fn apply<R>(&mut self, next: Vec<DisplayMarker<M>>, renderer: &mut R) -> MarkerDiff
    where
        R: MarkerRenderer<M>,
    {
        if self.displayed.is_empty() {
            next.iter().for_each(|marker| renderer.show(marker));
            let diff = MarkerDiff {
                added: next.len(),
                ..MarkerDiff::default()
            };
            self.displayed = next;
            return diff;
        }

        // Unclaimed positions in `next` per identity, earliest on top.
        let mut unclaimed: FxHashMap<MarkerId, Vec<usize>> = FxHashMap::default();
        for (position, marker) in next.iter().enumerate().rev() {
            unclaimed.entry(marker.identity()).or_default().push(position);
        }

        let mut claimed = vec![false; next.len()];
        let mut kept = Vec::new();
        let mut removed = Vec::new();

        for old in self.displayed.drain(..) {
            match unclaimed.get_mut(&old.identity()).and_then(Vec::pop) {
                Some(position) => {
                    claimed[position] = true;
                    kept.push(old);
                }
                None => removed.push(old),
            }
        }

        let added: Vec<DisplayMarker<M>> = next
            .into_iter()
            .zip(claimed)
            .filter_map(|(marker, claimed)| (!claimed).then_some(marker))
            .collect();

        added.iter().for_each(|marker| renderer.show(marker));
        removed.iter().for_each(|marker| renderer.hide(marker));

        let diff = MarkerDiff {
            kept: kept.len(),
            added: added.len(),
            removed: removed.len(),
        };
        log::trace!(
            "Display diff: {} kept, {} added, {} removed",
            diff.kept,
            diff.added,
            diff.removed
        );

        self.displayed = added;
        self.displayed.extend(kept);
        diff
    }

    /// Hide everything currently displayed.
    pub fn clear<R>(&mut self, renderer: &mut R)
    where
        R: MarkerRenderer<M>,
    {
        for marker in self.displayed.drain(..) {
            renderer.hide(&marker);
        }
    }
}

impl<M: Marker> Default for DisplayState<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Icon size class for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconTier {
    Single,
    Medium,
    Large,
}

impl IconTier {
    pub fn for_count(count: usize) -> Self {
        match count {
            0 | 1 => IconTier::Single,
            2..=99 => IconTier::Medium,
            _ => IconTier::Large,
        }
    }
}

/// Icon tier, badge text and info snippet derived from a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerAppearance {
    pub tier: IconTier,
    pub badge: String,
    pub snippet: String,
}

impl MarkerAppearance {
    pub fn of(marker: &dyn Marker) -> Self {
        let count = marker.cluster_count();
        let tier = IconTier::for_count(count);

        match tier {
            IconTier::Single => Self {
                tier,
                badge: "1".to_string(),
                snippet: marker.title().to_string(),
            },
            IconTier::Medium | IconTier::Large => Self {
                tier,
                badge: count.to_string(),
                snippet: marker.cluster_title().to_string(),
            },
        }
    }
}
