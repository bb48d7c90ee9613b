// CONTROLLER: input tracking, collision queries, and the frame loop
pub mod collision;
pub mod frame_loop;
pub mod input;
pub mod movement;

pub use collision::{CollisionDetector, PLAYER_HALF_EXTENTS};
pub use frame_loop::{CancelFlag, FrameClock, NavigationLoop, MAX_FRAME_DELTA};
pub use input::{Direction, InputEvent, InputState, KeyBindings, PointerLock, PointerLockState};
pub use movement::{MovementIntegrator, BASE_SPEED};
