use glam::Vec3;

use crate::model::RoomDescription;

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self { min: center - half, max: center + half }
    }

    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self { min: center - half, max: center + half }
    }

    /// Closed-interval overlap test: boxes that merely touch count as
    /// intersecting. Keeps numerical jitter from slipping the player through
    /// an exact wall boundary.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Immutable AABBs for the solid room geometry, derived once at scene-build
/// time. Never patched in-session; a changed room means a wholesale rebuild.
pub struct StaticColliderSet {
    boxes: Vec<Aabb>,
}

impl StaticColliderSet {
    /// Derive one collider per solid surface of the room.
    pub fn build(room: &RoomDescription) -> Self {
        let boxes = room
            .surfaces
            .iter()
            .filter(|s| s.solid)
            .map(|s| Aabb::from_center_size(s.center_vec(), s.size_vec()))
            .collect();
        Self { boxes }
    }

    pub fn from_boxes(boxes: Vec<Aabb>) -> Self {
        Self { boxes }
    }

    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
