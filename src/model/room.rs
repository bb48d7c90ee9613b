use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which way a wall-mounted quad faces (its outward normal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    PosX,
    NegX,
    PosZ,
    NegZ,
}

/// A static room panel: floor, ceiling or wall. Solid panels become colliders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surface {
    pub name: String,
    pub center: [f32; 3],
    pub size: [f32; 3],
    pub color: [f32; 4],
    pub solid: bool,
}

impl Surface {
    pub fn center_vec(&self) -> Vec3 {
        Vec3::from_array(self.center)
    }

    pub fn size_vec(&self) -> Vec3 {
        Vec3::from_array(self.size)
    }
}

/// A framed artwork hung slightly in front of a wall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artwork {
    pub name: String,
    pub center: [f32; 3],
    /// width, height in world units
    pub size: [f32; 2],
    pub facing: Facing,
    pub color: [f32; 4],
}

impl Artwork {
    /// Thin box extents oriented by the wall the artwork hangs on.
    pub fn extents(&self) -> Vec3 {
        let [w, h] = self.size;
        match self.facing {
            Facing::PosZ | Facing::NegZ => Vec3::new(w, h, PANEL_THICKNESS),
            Facing::PosX | Facing::NegX => Vec3::new(PANEL_THICKNESS, h, w),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spotlight {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub intensity: f32,
}

/// Declarative description of the whole room. One generic scene builder
/// consumes it; nothing else hard-codes geometry. Loadable from ron so the
/// layout can be swapped without touching code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDescription {
    pub spawn: [f32; 3],
    pub surfaces: Vec<Surface>,
    pub artworks: Vec<Artwork>,
    pub spotlights: Vec<Spotlight>,
}

pub const PANEL_THICKNESS: f32 = 0.001;

const ROOM_HALF: f32 = 20.0;
const WALL_WIDTH: f32 = 85.0;
const WALL_HEIGHT: f32 = 20.0;
const CEILING_Y: f32 = 10.0;
const FLOOR_Y: f32 = -std::f32::consts::PI;

const WALL_COLOR: [f32; 4] = [0.88, 0.86, 0.82, 1.0];
const FLOOR_COLOR: [f32; 4] = [0.75, 0.73, 0.70, 1.0];
const CEILING_COLOR: [f32; 4] = [0.92, 0.92, 0.90, 1.0];

impl RoomDescription {
    pub fn from_ron_str(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// The default exhibition room: a 40x40 floor plan with four oversized
    /// wall panels, eight artworks and one spotlight per artwork.
    pub fn gallery() -> Self {
        let wall = |name: &str, center: [f32; 3], size: [f32; 3]| Surface {
            name: name.to_string(),
            center,
            size,
            color: WALL_COLOR,
            solid: true,
        };

        let art = |name: &str, center: [f32; 3], size: [f32; 2], facing: Facing, color: [f32; 4]| {
            Artwork { name: name.to_string(), center, size, facing, color }
        };

        let spot = |position: [f32; 3], target: [f32; 3]| Spotlight {
            position,
            target,
            intensity: 3.0,
        };

        Self {
            spawn: [0.0, 3.0, 0.0],
            surfaces: vec![
                Surface {
                    name: "floor".to_string(),
                    center: [0.0, FLOOR_Y, 0.0],
                    size: [50.0, PANEL_THICKNESS, 50.0],
                    color: FLOOR_COLOR,
                    solid: false,
                },
                Surface {
                    name: "ceiling".to_string(),
                    center: [0.0, CEILING_Y, 0.0],
                    size: [50.0, PANEL_THICKNESS, 50.0],
                    color: CEILING_COLOR,
                    solid: false,
                },
                wall("front", [0.0, 0.0, -ROOM_HALF], [WALL_WIDTH, WALL_HEIGHT, PANEL_THICKNESS]),
                wall("back", [0.0, 0.0, ROOM_HALF], [WALL_WIDTH, WALL_HEIGHT, PANEL_THICKNESS]),
                wall("left", [-ROOM_HALF, 0.0, 0.0], [PANEL_THICKNESS, WALL_HEIGHT, WALL_WIDTH]),
                wall("right", [ROOM_HALF, 0.0, 0.0], [PANEL_THICKNESS, WALL_HEIGHT, WALL_WIDTH]),
            ],
            artworks: vec![
                // front wall
                art("shujaaz", [0.0, 4.0, -19.99], [8.0, 9.0], Facing::PosZ, [0.62, 0.35, 0.22, 1.0]),
                art("rick", [12.0, 4.0, -19.99], [8.0, 9.0], Facing::PosZ, [0.25, 0.45, 0.62, 1.0]),
                art("reefer", [-12.0, 4.0, -19.99], [8.0, 9.0], Facing::PosZ, [0.30, 0.52, 0.35, 1.0]),
                // right wall
                art("vi", [19.99, 4.0, -9.0], [8.0, 9.0], Facing::NegX, [0.55, 0.28, 0.48, 1.0]),
                art("val", [19.99, 4.0, 1.0], [8.0, 9.0], Facing::NegX, [0.70, 0.55, 0.25, 1.0]),
                // left wall
                art("girl", [-19.99, 4.0, -10.0], [9.0, 8.0], Facing::PosX, [0.42, 0.40, 0.58, 1.0]),
                art("santa", [-19.99, 4.0, 2.0], [9.0, 8.0], Facing::PosX, [0.60, 0.30, 0.28, 1.0]),
                art("may", [-19.99, 4.0, 14.0], [9.0, 8.0], Facing::PosX, [0.35, 0.50, 0.55, 1.0]),
            ],
            spotlights: vec![
                spot([0.0, 10.0, -19.5], [0.0, 4.0, -19.99]),
                spot([12.0, 10.0, -19.5], [12.0, 4.0, -19.99]),
                spot([-12.0, 10.0, -19.5], [-12.0, 4.0, -19.99]),
                spot([19.5, 10.0, -9.0], [19.99, 4.0, -9.0]),
                spot([19.5, 10.0, 1.0], [19.99, 4.0, 1.0]),
                spot([-19.5, 10.0, -10.0], [-19.99, 4.0, -10.0]),
                spot([-19.5, 10.0, 2.0], [-19.99, 4.0, 2.0]),
                spot([-19.5, 10.0, 14.0], [-19.99, 4.0, 14.0]),
            ],
        }
    }

    pub fn spawn_vec(&self) -> Vec3 {
        Vec3::from_array(self.spawn)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl RoomDescription {
    /// Load a room layout from a ron file, falling back to the built-in
    /// gallery when the file is missing or malformed. A bad layout file must
    /// not keep the walkthrough from starting.
    pub fn from_ron_file_or_gallery(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match Self::from_ron_str(&text) {
                Ok(room) => {
                    tracing::info!("loaded room layout from {path}");
                    room
                }
                Err(e) => {
                    tracing::warn!("malformed room file {path}: {e}; using built-in gallery");
                    Self::gallery()
                }
            },
            Err(e) => {
                tracing::warn!("room file {path} unreadable: {e}; using built-in gallery");
                Self::gallery()
            }
        }
    }

    /// The native configuration surface: `ROOM_FILE` names a ron layout,
    /// unset means the built-in gallery.
    pub fn from_env_or_gallery() -> Self {
        match std::env::var("ROOM_FILE") {
            Ok(path) => Self::from_ron_file_or_gallery(&path),
            Err(_) => Self::gallery(),
        }
    }
}
