//! Mesh submission and the wgpu frame pass.
//!
//! Rendering is split in two:
//!
//! 1. [`MeshSubmitSystem`] runs as the last core system. It validates the
//!    active camera, lazily refreshes dirty transform matrices, and fills
//!    the [`DrawList`] resource with one entry per visible mesh.
//! 2. The window loop calls [`render_frame`], which turns the draw list
//!    into a single forward render pass and presents. Without a valid
//!    camera the frame is just cleared to [`ClearColor`].
//!
//! The split keeps everything up to the draw list free of GPU types, so
//! mesh submission is fully testable headless.

mod gpu;
mod mesh;
mod pipeline;
mod texture;

pub use gpu::GpuContext;
pub use mesh::{MeshHandle, MeshStore, MeshVertex, cube_geometry, plane_geometry};
pub use texture::{TextureHandle, TextureStore};

use glam::Mat4;

use crate::camera::{ActiveCamera, Camera, camera_renderable};
use crate::ecs::{System, Transform, World};

use pipeline::{CameraUniform, MeshPipeline, ModelUniform};

/// Background color of the frame, linear RGBA.
#[derive(Debug, Clone, Copy)]
pub struct ClearColor(pub [f64; 4]);

impl Default for ClearColor {
    fn default() -> Self {
        Self([0.1, 0.1, 0.15, 1.0])
    }
}

/// Attach to an entity with a [`Transform`] to draw a mesh at its world
/// pose.
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub mesh: MeshHandle,
    /// Solid-color texture; `None` draws untinted white.
    pub texture: Option<TextureHandle>,
    /// Multiplied with the texture, linear RGBA.
    pub color: [f32; 4],
    pub visible: bool,
}

impl MeshRenderer {
    pub fn new(mesh: MeshHandle) -> Self {
        Self {
            mesh,
            texture: None,
            color: [1.0, 1.0, 1.0, 1.0],
            visible: true,
        }
    }

    pub fn cube() -> Self {
        Self::new(MeshStore::cube())
    }

    pub fn plane() -> Self {
        Self::new(MeshStore::plane())
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self::cube()
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DrawCall {
    pub model: Mat4,
    pub color: [f32; 4],
    pub mesh: MeshHandle,
    pub texture: Option<TextureHandle>,
}

/// Per-frame draw list, rebuilt by [`MeshSubmitSystem`] and consumed by
/// [`render_frame`].
#[derive(Default)]
pub struct DrawList {
    pub(crate) view_proj: Mat4,
    pub(crate) calls: Vec<DrawCall>,
}

/// Collects visible meshes into the [`DrawList`].
pub struct MeshSubmitSystem;

impl System for MeshSubmitSystem {
    fn name(&self) -> &'static str {
        "mesh"
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        submit_meshes(world);
    }
}

pub(crate) fn submit_meshes(world: &mut World) {
    if !world.has_resource::<DrawList>() {
        world.insert_resource(DrawList::default());
    }

    let active = world
        .get_resource::<ActiveCamera>()
        .copied()
        .unwrap_or_default();
    let camera_entity = match active.0 {
        Some(entity) if camera_renderable(world, entity) => Some(entity),
        Some(entity) => {
            log::warn!("active camera {entity} is invalid; skipping mesh submission");
            world.insert_resource(ActiveCamera(None));
            None
        }
        None => None,
    };
    let Some(camera_entity) = camera_entity else {
        let list = world.resource_mut::<DrawList>();
        list.view_proj = Mat4::IDENTITY;
        list.calls.clear();
        return;
    };
    let view_proj = world
        .get::<Camera>(camera_entity)
        .map(|camera| camera.view_projection())
        .unwrap_or(Mat4::IDENTITY);

    let mut calls = Vec::new();
    for entity in world.view::<(Transform, MeshRenderer)>() {
        let Some(renderer) = world.get::<MeshRenderer>(entity).cloned() else {
            continue;
        };
        if !renderer.visible {
            continue;
        }
        let Some(transform) = world.get_mut::<Transform>(entity) else {
            continue;
        };
        if transform.matrix_dirty {
            transform.refresh_matrices();
        }
        calls.push(DrawCall {
            model: transform.world_matrix,
            color: renderer.color,
            mesh: renderer.mesh,
            texture: renderer.texture,
        });
    }

    let list = world.resource_mut::<DrawList>();
    list.view_proj = view_proj;
    list.calls = calls;
}

/// Encoder and surface view for the frame being recorded. Handed to the
/// editor overlay after the mesh pass.
pub(crate) struct FrameContext<'a> {
    pub encoder: wgpu::CommandEncoder,
    pub view: wgpu::TextureView,
    pub gpu: &'a GpuContext,
}

/// Records and presents one frame from the current [`DrawList`].
///
/// Takes the GPU resources out of the world for the duration of the frame
/// and restores them before returning, including on surface errors.
pub(crate) fn render_frame(
    world: &mut World,
    overlay: impl FnOnce(&mut FrameContext<'_>),
) -> Result<(), wgpu::SurfaceError> {
    let Some(gpu) = world.resource_remove::<GpuContext>() else {
        return Ok(());
    };
    let output = match gpu.surface.get_current_texture() {
        Ok(output) => output,
        Err(error) => {
            world.insert_resource(gpu);
            return Err(error);
        }
    };
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    if !world.has_resource::<MeshPipeline>() {
        world.insert_resource(MeshPipeline::new(&gpu));
        world.insert_resource(MeshStore::new(&gpu));
        world.insert_resource(TextureStore::new(&gpu));
        log::info!("mesh pipeline initialized");
    }
    let mut pipeline = world
        .resource_remove::<MeshPipeline>()
        .expect("mesh pipeline was just ensured");
    let mesh_store = world
        .resource_remove::<MeshStore>()
        .expect("mesh store was just ensured");
    let texture_store = world
        .resource_remove::<TextureStore>()
        .expect("texture store was just ensured");
    let draw_list = world.resource_remove::<DrawList>().unwrap_or_default();

    let (width, height) = gpu.surface_size();
    pipeline.refresh_depth(&gpu.device, width, height);

    gpu.queue.write_buffer(
        &pipeline.camera_buffer,
        0,
        bytemuck::bytes_of(&CameraUniform {
            view_proj: draw_list.view_proj.to_cols_array_2d(),
        }),
    );
    pipeline.ensure_model_capacity(&gpu.device, draw_list.calls.len());
    for (index, call) in draw_list.calls.iter().enumerate() {
        let uniform = ModelUniform {
            model: call.model.to_cols_array_2d(),
            color: call.color,
        };
        gpu.queue.write_buffer(
            &pipeline.model_buffer,
            index as u64 * pipeline.model_stride as u64,
            bytemuck::bytes_of(&uniform),
        );
    }

    // One bind group per distinct texture used this frame.
    let mut texture_groups: Vec<(TextureHandle, wgpu::BindGroup)> = Vec::new();
    for call in &draw_list.calls {
        let handle = call.texture.unwrap_or(TextureStore::white());
        if texture_groups.iter().any(|(existing, _)| *existing == handle) {
            continue;
        }
        if let Some(texture) = texture_store.get(handle) {
            texture_groups.push((handle, pipeline.texture_bind_group(&gpu.device, &texture.view)));
        }
    }

    let clear = world
        .get_resource::<ClearColor>()
        .copied()
        .unwrap_or_default();

    let mut frame = FrameContext {
        encoder: gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("fafnir frame encoder"),
            }),
        view,
        gpu: &gpu,
    };

    {
        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fafnir mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.0[0],
                        g: clear.0[1],
                        b: clear.0[2],
                        a: clear.0[3],
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &pipeline.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if !draw_list.calls.is_empty() {
            pass.set_pipeline(&pipeline.pipeline);
            pass.set_bind_group(0, &pipeline.camera_bind_group, &[]);
            let mut bound_texture = None;
            for (index, call) in draw_list.calls.iter().enumerate() {
                let Some(mesh) = mesh_store.get(call.mesh) else {
                    continue;
                };
                let handle = call.texture.unwrap_or(TextureStore::white());
                if bound_texture != Some(handle) {
                    let Some((_, group)) = texture_groups
                        .iter()
                        .find(|(existing, _)| *existing == handle)
                    else {
                        continue;
                    };
                    pass.set_bind_group(2, group, &[]);
                    bound_texture = Some(handle);
                }
                pass.set_bind_group(
                    1,
                    &pipeline.model_bind_group,
                    &[index as u32 * pipeline.model_stride],
                );
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
    }

    overlay(&mut frame);

    gpu.queue.submit(std::iter::once(frame.encoder.finish()));
    output.present();

    world.insert_resource(pipeline);
    world.insert_resource(mesh_store);
    world.insert_resource(texture_store);
    world.insert_resource(draw_list);
    world.insert_resource(gpu);
    Ok(())
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use crate::ecs::resolve_world_transforms;

    use super::*;

    #[test]
    fn no_camera_leaves_list_empty() {
        let mut world = World::new();
        world.spawn((Transform::default(), MeshRenderer::cube()));
        submit_meshes(&mut world);
        assert!(world.resource::<DrawList>().calls.is_empty());
    }

    #[test]
    fn invalid_camera_is_cleared_and_nothing_drawn() {
        let mut world = World::new();
        let camera = world.spawn((Transform::default(), Camera::main()));
        world.despawn(camera);
        world.insert_resource(ActiveCamera(Some(camera)));
        world.spawn((Transform::default(), MeshRenderer::cube()));

        submit_meshes(&mut world);
        assert!(world.resource::<DrawList>().calls.is_empty());
        assert_eq!(world.resource::<ActiveCamera>().0, None);
    }

    #[test]
    fn visible_meshes_are_collected() {
        let mut world = World::new();
        let camera = world.spawn((Transform::from_xyz(0.0, 0.0, 5.0), Camera::main()));
        world.insert_resource(ActiveCamera(Some(camera)));
        world.spawn((Transform::default(), MeshRenderer::cube()));
        world.spawn((
            Transform::from_xyz(2.0, 0.0, 0.0),
            MeshRenderer::cube().with_color([1.0, 0.0, 0.0, 1.0]),
        ));
        world.spawn((
            Transform::default(),
            MeshRenderer {
                visible: false,
                ..MeshRenderer::cube()
            },
        ));
        // A mesh without a transform never draws.
        world.spawn((MeshRenderer::cube(),));

        submit_meshes(&mut world);
        assert_eq!(world.resource::<DrawList>().calls.len(), 2);
    }

    #[test]
    fn submission_refreshes_dirty_matrices() {
        let mut world = World::new();
        let camera = world.spawn((Transform::default(), Camera::main()));
        world.insert_resource(ActiveCamera(Some(camera)));
        let e = world.spawn((Transform::from_xyz(3.0, 0.0, 0.0), MeshRenderer::cube()));
        resolve_world_transforms(&mut world);
        assert!(world.get::<Transform>(e).unwrap().matrix_dirty);

        submit_meshes(&mut world);
        let transform = world.get::<Transform>(e).unwrap();
        assert!(!transform.matrix_dirty);
        let translation = transform.world_matrix.col(3);
        assert_eq!(translation.x, 3.0);

        let call_model = world.resource::<DrawList>().calls[0].model;
        assert_eq!(call_model, transform.world_matrix);
    }

    #[test]
    fn static_scene_keeps_cached_matrices() {
        let mut world = World::new();
        let camera = world.spawn((Transform::default(), Camera::main()));
        world.insert_resource(ActiveCamera(Some(camera)));
        let e = world.spawn((Transform::from_position(Vec3::ONE), MeshRenderer::cube()));

        resolve_world_transforms(&mut world);
        submit_meshes(&mut world);
        let first = world.get::<Transform>(e).unwrap().world_matrix;

        // No movement: the second pass must not dirty or change anything.
        resolve_world_transforms(&mut world);
        assert!(!world.get::<Transform>(e).unwrap().matrix_dirty);
        submit_meshes(&mut world);
        assert_eq!(world.get::<Transform>(e).unwrap().world_matrix, first);
    }
}
