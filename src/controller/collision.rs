//! Player-versus-room collision queries.

use glam::Vec3;

use crate::model::{Aabb, StaticColliderSet};

/// The camera stands in for the player body as a fixed-size box.
pub const PLAYER_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 0.5, 0.5);

/// Tests candidate player positions against the static room colliders.
/// Pure: holds only the immutable set, mutates nothing, and the same
/// candidate always yields the same answer.
pub struct CollisionDetector {
    colliders: StaticColliderSet,
}

impl CollisionDetector {
    pub fn new(colliders: StaticColliderSet) -> Self {
        Self { colliders }
    }

    /// True iff the player box centered at `candidate` overlaps (or exactly
    /// touches) any room collider. Short-circuits on the first hit; with a
    /// handful of walls the linear scan needs no spatial index.
    pub fn intersects(&self, candidate: Vec3) -> bool {
        let player = Aabb::from_center_half_extents(candidate, PLAYER_HALF_EXTENTS);
        self.colliders.boxes().iter().any(|wall| player.intersects(wall))
    }

    pub fn colliders(&self) -> &StaticColliderSet {
        &self.colliders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoomDescription;

    fn front_wall_only() -> CollisionDetector {
        // X in [-42.5, 42.5], Y in [-10, 10], Z in [-20.0005, -19.9995]
        let wall = Aabb::new(
            Vec3::new(-42.5, -10.0, -20.0005),
            Vec3::new(42.5, 10.0, -19.9995),
        );
        CollisionDetector::new(StaticColliderSet::from_boxes(vec![wall]))
    }

    #[test]
    fn test_position_near_wall_is_clear() {
        let detector = front_wall_only();
        // Player box Z in [-19.5, -18.5], short of the wall
        assert!(!detector.intersects(Vec3::new(0.0, 3.0, -19.0)));
    }

    #[test]
    fn test_position_through_wall_is_hit() {
        let detector = front_wall_only();
        // Player box Z in [-20.1, -19.1], overlapping the wall slab
        assert!(detector.intersects(Vec3::new(0.0, 3.0, -19.6)));
    }

    #[test]
    fn test_exactly_touching_wall_is_hit() {
        let detector = front_wall_only();
        // Box max Z lands exactly on the wall's min Z
        assert!(detector.intersects(Vec3::new(0.0, 3.0, -20.5005)));
    }

    #[test]
    fn test_repeated_queries_are_idempotent() {
        let detector = front_wall_only();
        let candidate = Vec3::new(0.0, 3.0, -19.6);
        let first = detector.intersects(candidate);
        for _ in 0..10 {
            assert_eq!(detector.intersects(candidate), first);
        }
        assert_eq!(detector.colliders().len(), 1, "queries leave the set untouched");
    }

    #[test]
    fn test_empty_set_never_intersects() {
        let detector = CollisionDetector::new(StaticColliderSet::from_boxes(Vec::new()));
        assert!(!detector.intersects(Vec3::ZERO));
        assert!(!detector.intersects(Vec3::new(1e6, -1e6, 0.0)));
    }

    #[test]
    fn test_gallery_spawn_is_clear_of_all_walls() {
        let room = RoomDescription::gallery();
        let detector = CollisionDetector::new(StaticColliderSet::build(&room));
        assert!(!detector.intersects(room.spawn_vec()));
    }
}
