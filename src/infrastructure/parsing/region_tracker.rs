//! Container / sub-container region tracking
//!
//! Tracks entry into and exit from the configured regions while events stream
//! past. Same-name tags nested inside an open region bump a depth counter, so
//! a region only closes on the end tag that balances its own start tag.

use tracing::{debug, trace};

use super::ExtractionStrategy;
use crate::domain::RegionLayout;

/// Outcome of an end tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionSignal {
    /// Keep feeding events
    Continue,
    /// A sub-container closed and its record boundary fired; keep feeding
    RegionClosed,
    /// The container closed; stop feeding events for this document
    Abort,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionState {
    pub inside_container: bool,
    pub inside_sub_container: bool,
    pub container_depth: usize,
    pub sub_container_depth: usize,
}

/// Region state machine driving one extraction strategy
pub struct RegionTracker<'c, S> {
    layout: &'c RegionLayout,
    state: RegionState,
    strategy: S,
}

impl<'c, S: ExtractionStrategy> RegionTracker<'c, S> {
    pub fn new(layout: &'c RegionLayout, strategy: S) -> Self {
        Self {
            layout,
            state: RegionState::default(),
            strategy,
        }
    }

    pub fn state(&self) -> RegionState {
        self.state
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn into_strategy(self) -> S {
        self.strategy
    }

    /// Inside the sub-container, or inside the container when there is none
    pub fn inside_innermost(&self) -> bool {
        if self.layout.has_sub_container() {
            self.state.inside_sub_container
        } else {
            self.state.inside_container
        }
    }

    pub fn on_start_tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        // The strategy sees the tag against the state before this tag, so the
        // tag opening a region is never itself a URL or field candidate.
        if self.inside_innermost() {
            self.strategy.on_start_tag(name, attrs);
        }

        let layout = self.layout;
        if layout.container.matches_name(name) {
            if self.state.inside_container {
                self.state.container_depth += 1;
                trace!(depth = self.state.container_depth, "nested <{}> inside container", name);
                if !layout.has_sub_container() {
                    return;
                }
            } else if layout.container.accepts(attrs) {
                self.state.inside_container = true;
                debug!("Entered container <{}>", name);
                return;
            }
        }

        if let Some(sub_container) = &layout.sub_container {
            if sub_container.matches_name(name) {
                if self.state.inside_sub_container {
                    self.state.sub_container_depth += 1;
                    trace!(depth = self.state.sub_container_depth, "nested <{}> inside sub-container", name);
                    return;
                }
                if sub_container.accepts(attrs) {
                    self.state.inside_sub_container = true;
                    trace!("Entered sub-container <{}>", name);
                }
            }
        }
    }

    pub fn on_text(&mut self, content: &str) {
        self.strategy.on_text(content);
    }

    pub fn on_end_tag(&mut self, name: &str) -> RegionSignal {
        self.strategy.on_end_tag(name);

        let layout = self.layout;
        let mut signal = RegionSignal::Continue;

        if let Some(sub_container) = &layout.sub_container {
            if self.state.inside_sub_container && sub_container.matches_name(name) {
                if self.state.sub_container_depth == 0 {
                    self.state.inside_sub_container = false;
                    self.strategy.on_sub_region_exit();
                    trace!("Left sub-container <{}>", name);
                    signal = RegionSignal::RegionClosed;
                } else {
                    self.state.sub_container_depth -= 1;
                }
            }
        }

        if self.state.inside_container && layout.container.matches_name(name) {
            if self.state.container_depth == 0 {
                if !layout.has_sub_container() {
                    self.strategy.on_sub_region_exit();
                }
                debug!("Container <{}> closed", name);
                return RegionSignal::Abort;
            }
            self.state.container_depth -= 1;
        }

        signal
    }
}
