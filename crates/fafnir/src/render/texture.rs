//! Solid-color texture storage.
//!
//! The engine does no image decoding; textures are single-pixel solid
//! colors, enough to tint meshes per material. Handle 0 is always opaque
//! white, used whenever a [`MeshRenderer`](super::MeshRenderer) names no
//! texture.

use super::gpu::GpuContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) usize);

pub(crate) struct GpuTexture {
    pub view: wgpu::TextureView,
}

pub struct TextureStore {
    textures: Vec<GpuTexture>,
}

impl TextureStore {
    const WHITE: TextureHandle = TextureHandle(0);

    pub fn new(gpu: &GpuContext) -> Self {
        let mut store = Self {
            textures: Vec::new(),
        };
        store.create_solid(gpu, [255, 255, 255, 255]);
        store
    }

    /// Uploads a 1x1 RGBA texture and returns its handle.
    pub fn create_solid(&mut self, gpu: &GpuContext, rgba: [u8; 4]) -> TextureHandle {
        let size = wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("fafnir solid texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            size,
        );
        let handle = TextureHandle(self.textures.len());
        self.textures.push(GpuTexture {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        });
        handle
    }

    pub(crate) fn get(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.textures.get(handle.0)
    }

    /// Opaque white, the fallback for untextured meshes.
    pub fn white() -> TextureHandle {
        Self::WHITE
    }
}
