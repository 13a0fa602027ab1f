//! Decides which unloaded slots to request next.

use web_time::Instant;

use crate::camera::Frustum;
use crate::descriptor::{ImageDescriptor, SlotIndex};
use crate::layout::PlacementSlot;
use crate::loader::{LoadExecutor, RequestOutcome, ResourceLoader};

/// Visible-first selection of unloaded slots.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityPrioritizer {
    pub candidates_per_pass: usize,
}

impl VisibilityPrioritizer {
    pub fn new(candidates_per_pass: usize) -> Self {
        Self {
            candidates_per_pass: candidates_per_pass.max(1),
        }
    }

    /// Pick up to `min(candidates_per_pass, budget)` unloaded slots, in index
    /// order, preferring those inside the frustum.
    pub fn select(
        &self,
        loader: &ResourceLoader,
        slots: &[PlacementSlot],
        frustum: &Frustum,
    ) -> Vec<SlotIndex> {
        let take = self.candidates_per_pass.min(loader.remaining_budget());
        if take == 0 {
            return Vec::new();
        }

        let visible: Vec<SlotIndex> = loader
            .unloaded()
            .filter(|slot| {
                slots
                    .get(slot.get())
                    .is_some_and(|p| frustum.contains_point(p.position))
            })
            .take(take)
            .collect();

        if !visible.is_empty() {
            visible
        } else {
            loader.unloaded().take(take).collect()
        }
    }

    /// Request the selected slots. Returns the slots whose load started.
    pub fn check_and_load_more(
        &self,
        loader: &mut ResourceLoader,
        slots: &[PlacementSlot],
        descriptors: &[ImageDescriptor],
        frustum: &Frustum,
        executor: &mut dyn LoadExecutor,
        now: Instant,
    ) -> Vec<SlotIndex> {
        let selected = self.select(loader, slots, frustum);
        if selected.is_empty() {
            return selected;
        }

        let mut started = Vec::with_capacity(selected.len());
        for slot in selected {
            let Some(descriptor) = descriptors.get(slot.get()) else {
                continue;
            };
            if loader.request_load(slot, &descriptor.thumbnail, &mut *executor, now)
                == RequestOutcome::Started
            {
                started.push(slot);
            }
        }

        log::debug!(
            "Prioritizer started {} load(s), {} in flight, {} unloaded",
            started.len(),
            loader.loading_count(),
            loader.unloaded().count()
        );
        started
    }
}
