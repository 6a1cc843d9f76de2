//! Waiting line in front of the truck.
//!
//! Membership is strictly first-come-first-served. Slot `i` sits at
//! `anchor + back_direction * spacing * i`, snapped to walkable ground when the
//! navigator finds a point within the snap radius.

use std::collections::HashMap;

use glam::Vec3;

use crate::{CustomerId, CustomerState, GameState, Navigator, QueueLayoutDef, QueueState};

impl QueueState {
    /// Builds the queue from layout. A missing anchor or a zero back direction
    /// leaves the queue disabled: every join is refused.
    pub fn from_layout(layout: &QueueLayoutDef) -> Self {
        let back_direction = layout.back_direction.normalize_or_zero();
        if layout.anchor.is_none() {
            tracing::warn!("queue has no anchor point, disabling");
        }
        if back_direction.length_squared() < f32::EPSILON {
            tracing::warn!("queue back direction is zero, disabling");
        }
        Self {
            members: Vec::new(),
            anchor: layout.anchor,
            back_direction,
            spacing_m: layout.spacing_m,
            max_slots: layout.max_slots,
            snap_radius_m: layout.snap_radius_m,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.anchor.is_some() && self.back_direction.length_squared() > 0.5
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &CustomerId) -> bool {
        self.members.contains(id)
    }

    pub fn front(&self) -> Option<&CustomerId> {
        self.members.first()
    }

    pub fn is_front(&self, id: &CustomerId) -> bool {
        self.members.first() == Some(id)
    }

    pub fn index_of(&self, id: &CustomerId) -> Option<usize> {
        self.members.iter().position(|m| m == id)
    }

    /// Appends to the back. Returns `true` only when the member was added;
    /// joining twice or joining a disabled queue is a no-op. Members past
    /// `max_slots` keep stepping back behind the last laid-out slot.
    pub fn join(&mut self, id: &CustomerId) -> bool {
        if !self.is_enabled() || self.contains(id) {
            return false;
        }
        if self.members.len() >= self.max_slots {
            tracing::debug!(
                customer = %id,
                max_slots = self.max_slots,
                "queue overflow, standing behind the last slot"
            );
        }
        self.members.push(id.clone());
        true
    }

    /// Removes the member if present. Everyone behind it moves up one slot.
    pub fn leave(&mut self, id: &CustomerId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.members.remove(index);
        true
    }

    /// Unsnapped slot position.
    pub fn raw_slot_position(&self, index: usize) -> Option<Vec3> {
        let anchor = self.anchor?;
        Some(anchor + self.back_direction * self.spacing_m * index as f32)
    }

    pub fn slot_position(&self, index: usize, nav: &impl Navigator) -> Option<Vec3> {
        let raw = self.raw_slot_position(index)?;
        Some(nav.nearest_walkable(raw, self.snap_radius_m).unwrap_or(raw))
    }
}

/// Points every queued customer at its current slot.
pub(crate) fn reassign_slots(
    queue: &QueueState,
    customers: &mut HashMap<CustomerId, CustomerState>,
    nav: &impl Navigator,
) {
    for (index, member) in queue.members.iter().enumerate() {
        let Some(target) = queue.slot_position(index, nav) else {
            continue;
        };
        if let Some(customer) = customers.get_mut(member) {
            customer.agent.set_destination(target);
        }
    }
}

/// Joins the queue and re-targets every member. Returns the slot taken.
pub(crate) fn join_queue(
    state: &mut GameState,
    nav: &impl Navigator,
    id: &CustomerId,
) -> Option<usize> {
    if !state.queue.join(id) {
        return None;
    }
    reassign_slots(&state.queue, &mut state.customers, nav);
    Some(state.queue.len() - 1)
}

/// Leaves the queue and closes the gap. No-op for non-members.
pub(crate) fn leave_queue(state: &mut GameState, nav: &impl Navigator, id: &CustomerId) -> bool {
    if !state.queue.leave(id) {
        return false;
    }
    reassign_slots(&state.queue, &mut state.customers, nav);
    true
}
