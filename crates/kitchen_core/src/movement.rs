//! Navigation seam: walkability queries plus a default straight-line walker.

use glam::Vec3;

use crate::Agent;

/// Destinations closer than this to the current one are treated as unchanged.
const SAME_DESTINATION_EPSILON_M: f32 = 1e-4;

/// External navigation collaborator.
///
/// Implementors answer walkability queries; `step_agent` may be overridden to
/// drive agents from a real navigation mesh. The default walks in a straight
/// line and spends one step computing a path after every destination change.
pub trait Navigator {
    /// Nearest walkable point within `max_radius` of `point`, if any.
    fn nearest_walkable(&self, point: Vec3, max_radius: f32) -> Option<Vec3>;

    fn step_agent(&self, agent: &mut Agent, speed_mps: f32, dt: f32) {
        if agent.path_pending {
            agent.path_pending = false;
            return;
        }
        let Some(destination) = agent.destination else {
            return;
        };
        let to_destination = destination - agent.position;
        let distance = to_destination.length();
        let step = speed_mps * dt;
        if distance <= step {
            agent.position = destination;
        } else {
            agent.position += to_destination / distance * step;
        }
    }
}

/// Everything is walkable. Used headless and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFloor;

impl Navigator for OpenFloor {
    fn nearest_walkable(&self, point: Vec3, _max_radius: f32) -> Option<Vec3> {
        Some(point)
    }
}

impl Agent {
    pub fn new(position: Vec3, stopping_distance: f32) -> Self {
        Self {
            position,
            destination: None,
            path_pending: false,
            stopping_distance,
        }
    }

    /// Replaces the destination. Re-targeting to the same point keeps the
    /// current path.
    pub fn set_destination(&mut self, destination: Vec3) {
        if let Some(current) = self.destination {
            if current.distance(destination) < SAME_DESTINATION_EPSILON_M {
                return;
            }
        }
        self.destination = Some(destination);
        self.path_pending = true;
    }

    pub fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(0.0, |destination| self.position.distance(destination))
    }

    /// Arrived and idle: no path being computed and within stopping tolerance.
    pub fn is_stationary(&self) -> bool {
        !self.path_pending && self.remaining_distance() <= self.stopping_distance
    }
}
