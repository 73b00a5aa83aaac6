//! Mesh geometry and GPU mesh storage.
//!
//! Meshes are uploaded once and referenced by copyable [`MeshHandle`]s.
//! The store pre-uploads a unit cube and a unit plane at creation, so
//! [`MeshRenderer::cube`](super::MeshRenderer::cube) and friends work
//! without any asset plumbing.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::gpu::GpuContext;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub(crate) const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };
}

/// Index into the [`MeshStore`]. Stays valid for the store's lifetime;
/// meshes are never evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub(crate) usize);

pub(crate) struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

pub struct MeshStore {
    meshes: Vec<GpuMesh>,
}

impl MeshStore {
    const CUBE: MeshHandle = MeshHandle(0);
    const PLANE: MeshHandle = MeshHandle(1);

    pub fn new(gpu: &GpuContext) -> Self {
        let mut store = Self { meshes: Vec::new() };
        let (vertices, indices) = cube_geometry();
        store.upload(gpu, &vertices, &indices);
        let (vertices, indices) = plane_geometry();
        store.upload(gpu, &vertices, &indices);
        store
    }

    /// Uploads a mesh and returns its handle.
    pub fn upload(
        &mut self,
        gpu: &GpuContext,
        vertices: &[MeshVertex],
        indices: &[u32],
    ) -> MeshHandle {
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("fafnir mesh vertices"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("fafnir mesh indices"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let handle = MeshHandle(self.meshes.len());
        self.meshes.push(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        });
        handle
    }

    pub(crate) fn get(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(handle.0)
    }

    /// The built-in unit cube, centered at the origin.
    pub fn cube() -> MeshHandle {
        Self::CUBE
    }

    /// The built-in 1x1 plane in XZ, facing +Y.
    pub fn plane() -> MeshHandle {
        Self::PLANE
    }
}

/// Unit cube with per-face normals: 24 vertices, 36 indices.
pub fn cube_geometry() -> (Vec<MeshVertex>, Vec<u32>) {
    let h = 0.5f32;
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +Z
        ([0.0, 0.0, 1.0], [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]]),
        // -Z
        ([0.0, 0.0, -1.0], [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]]),
        // +X
        ([1.0, 0.0, 0.0], [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]]),
        // -X
        ([-1.0, 0.0, 0.0], [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]]),
        // +Y
        ([0.0, 1.0, 0.0], [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]]),
        // -Y
        ([0.0, -1.0, 0.0], [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]]),
    ];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(uvs.iter()) {
            vertices.push(MeshVertex {
                position: *corner,
                normal,
                uv: *uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

/// 1x1 plane in the XZ plane, facing +Y: 4 vertices, 6 indices.
pub fn plane_geometry() -> (Vec<MeshVertex>, Vec<u32>) {
    let h = 0.5f32;
    let normal = [0.0, 1.0, 0.0];
    let vertices = vec![
        MeshVertex {
            position: [-h, 0.0, h],
            normal,
            uv: [0.0, 1.0],
        },
        MeshVertex {
            position: [h, 0.0, h],
            normal,
            uv: [1.0, 1.0],
        },
        MeshVertex {
            position: [h, 0.0, -h],
            normal,
            uv: [1.0, 0.0],
        },
        MeshVertex {
            position: [-h, 0.0, -h],
            normal,
            uv: [0.0, 0.0],
        },
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_per_face_normals() {
        let (vertices, indices) = cube_geometry();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        for vertex in &vertices {
            let [x, y, z] = vertex.normal;
            let length = (x * x + y * y + z * z).sqrt();
            assert!((length - 1.0).abs() < 1e-6);
        }
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn plane_is_flat_and_upward() {
        let (vertices, indices) = plane_geometry();
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
        assert!(vertices.iter().all(|v| v.position[1] == 0.0));
        assert!(vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn builtin_handles_are_stable() {
        assert_eq!(MeshStore::cube(), MeshHandle(0));
        assert_eq!(MeshStore::plane(), MeshHandle(1));
    }
}
