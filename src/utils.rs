use bytemuck::NoUninit;
use wgpu::util::DeviceExt;

use crate::model::RoomDescription;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self { vertices: Vec::new(), indices: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Append an axis-aligned box as six quads with per-face normals.
    /// Thin panels (walls, artworks) are just boxes with one near-zero axis.
    pub fn push_box(&mut self, center: [f32; 3], size: [f32; 3], color: [f32; 4]) {
        let [cx, cy, cz] = center;
        let [hx, hy, hz] = [size[0] * 0.5, size[1] * 0.5, size[2] * 0.5];
        let (x0, x1) = (cx - hx, cx + hx);
        let (y0, y1) = (cy - hy, cy + hy);
        let (z0, z1) = (cz - hz, cz + hz);

        // (normal, four corners)
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            // +Z
            ([0.0, 0.0, 1.0], [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]]),
            // -Z
            ([0.0, 0.0, -1.0], [[x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0]]),
            // +X
            ([1.0, 0.0, 0.0], [[x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1]]),
            // -X
            ([-1.0, 0.0, 0.0], [[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]]),
            // +Y
            ([0.0, 1.0, 0.0], [[x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [x0, y1, z0]]),
            // -Y
            ([0.0, -1.0, 0.0], [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]]),
        ];

        for (normal, corners) in faces {
            let base = self.vertices.len() as u32;
            for pos in corners {
                self.vertices.push(Vertex { pos, normal, color });
            }
            self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// The one generic scene builder: turns a declarative room description into
/// a single static mesh. Collision data is built separately from the same
/// description, never bolted onto render objects.
pub fn build_room_mesh(room: &RoomDescription) -> Mesh {
    let mut mesh = Mesh::empty();
    for surface in &room.surfaces {
        mesh.push_box(surface.center, surface.size, surface.color);
    }
    for artwork in &room.artworks {
        mesh.push_box(artwork.center, artwork.extents().to_array(), artwork.color);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_box_emits_six_faces() {
        let mut mesh = Mesh::empty();
        mesh.push_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_room_mesh_covers_surfaces_and_artworks() {
        let room = RoomDescription::gallery();
        let mesh = build_room_mesh(&room);
        let panels = room.surfaces.len() + room.artworks.len();
        assert_eq!(mesh.vertices.len(), panels * 24);
        assert_eq!(mesh.indices.len(), panels * 36);
    }
}
