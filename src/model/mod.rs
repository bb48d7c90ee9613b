// MODEL: camera, room description, and derived collision data
pub mod camera;
pub mod collider;
pub mod room;

pub use camera::Camera;
pub use collider::{Aabb, StaticColliderSet};
pub use room::{Artwork, Facing, RoomDescription, Spotlight, Surface};
