//! egui overlay with the in-engine editing panels.
//!
//! Compiled behind the `editor` feature and toggled at runtime with F12.
//! Three panels: entity tree on the left, component inspector on the right,
//! toolbar with entity commands along the top.
//!
//! The overlay lives as a field of the winit app instead of a world
//! resource; `egui_winit::State` is not `Sync`.

mod hierarchy;
mod inspector;
mod toolbar;

use std::sync::Arc;

use crate::ecs::{Entity, World};
use crate::render::{FrameContext, GpuContext};

/// Tessellated UI waiting to be painted onto the current frame.
struct PreparedUi {
    jobs: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    pixels_per_point: f32,
}

/// Editor overlay state: the egui plumbing plus the current selection.
pub(crate) struct EditorOverlay {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    /// Drawn and consuming input while true.
    pub visible: bool,
    selected: Option<Entity>,
    prepared: Option<PreparedUi>,
}

impl EditorOverlay {
    pub fn new(gpu: &GpuContext, window: &Arc<winit::window::Window>) -> Self {
        let ctx = egui::Context::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );
        let renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_format(),
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            ctx,
            winit_state,
            renderer,
            visible: false,
            selected: None,
            prepared: None,
        }
    }

    /// Hands a window event to egui. True means egui used it and the rest
    /// of the engine should not see it.
    pub fn on_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.visible && self.winit_state.on_window_event(window, event).consumed
    }

    /// Runs the panels and tessellates their output for [`paint`](Self::paint).
    pub fn prepare(&mut self, world: &mut World, window: &winit::window::Window) {
        if !self.visible {
            self.prepared = None;
            return;
        }

        // Drop a selection that no longer points at a live entity.
        if self.selected.is_some_and(|entity| !world.is_alive(entity)) {
            self.selected = None;
        }

        let input = self.winit_state.take_egui_input(window);
        let mut selected = self.selected;
        let output = self.ctx.run(input, |ctx| {
            toolbar::toolbar_panel(ctx, world, &mut selected);
            selected = hierarchy::hierarchy_panel(ctx, world, selected);
            inspector::inspector_panel(ctx, world, selected);
        });
        self.selected = selected;

        self.winit_state
            .handle_platform_output(window, output.platform_output);
        self.prepared = Some(PreparedUi {
            jobs: self.ctx.tessellate(output.shapes, output.pixels_per_point),
            textures: output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        });
    }

    /// Paints the prepared UI over the scene pass, keeping the existing
    /// color attachment contents.
    pub fn paint(&mut self, frame: &mut FrameContext<'_>) {
        let Some(ui) = self.prepared.take() else {
            return;
        };
        let gpu = frame.gpu;
        let (width, height) = gpu.surface_size();
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: ui.pixels_per_point,
        };

        for (id, delta) in &ui.textures.set {
            self.renderer
                .update_texture(&gpu.device, &gpu.queue, *id, delta);
        }
        let extra = self.renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut frame.encoder,
            &ui.jobs,
            &screen,
        );
        if !extra.is_empty() {
            gpu.queue.submit(extra);
        }

        {
            let pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("fafnir editor pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer
                .render(&mut pass.forget_lifetime(), &ui.jobs, &screen);
        }

        for id in &ui.textures.free {
            self.renderer.free_texture(id);
        }
    }
}
