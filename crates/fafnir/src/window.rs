//! The winit shell around the engine.
//!
//! [`WinitApp`] implements `ApplicationHandler`: window and GPU bring-up on
//! resume, event forwarding into [`InputState`], and the per-frame tick in
//! `RedrawRequested` (time, scenes, schedule, render).

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::ecs::{Schedule, World};
use crate::input::{CursorPosition, InputState};
use crate::render::{FrameContext, GpuContext, render_frame};
use crate::scene::SceneManager;
use crate::time::Time;

/// Owns the world and schedule for the lifetime of the event loop.
pub(crate) struct WinitApp {
    world: World,
    schedule: Schedule,
    startup: Vec<Box<dyn FnOnce(&mut World)>>,
    window: Option<Arc<Window>>,
    started: bool,
    title: String,
    #[cfg(feature = "editor")]
    editor: Option<crate::editor::EditorOverlay>,
}

impl WinitApp {
    pub fn new(
        world: World,
        schedule: Schedule,
        startup: Vec<Box<dyn FnOnce(&mut World)>>,
        title: String,
    ) -> Self {
        Self {
            world,
            schedule,
            startup,
            window: None,
            started: false,
            title,
            #[cfg(feature = "editor")]
            editor: None,
        }
    }
}

impl ApplicationHandler for WinitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
            let window = Arc::new(
                event_loop
                    .create_window(attrs)
                    .expect("Failed to create window"),
            );

            let gpu = GpuContext::new(window.clone());
            self.world.insert_resource(gpu);

            #[cfg(feature = "editor")]
            {
                let gpu = self.world.resource::<GpuContext>();
                self.editor = Some(crate::editor::EditorOverlay::new(gpu, &window));
            }

            self.window = Some(window);
        }

        // Late-added systems get their init here; setup closures run once,
        // after the GPU exists.
        if !self.started {
            self.started = true;
            self.schedule.init(&mut self.world);
            for setup in self.startup.drain(..) {
                setup(&mut self.world);
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        // Forward events to the editor overlay first.
        #[cfg(feature = "editor")]
        {
            if let Some(window) = &self.window {
                if let Some(editor) = &mut self.editor {
                    if editor.on_window_event(window, &event) {
                        return;
                    }
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down.");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.world.get_resource_mut::<GpuContext>() {
                    gpu.resize(size.width, size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                #[cfg(feature = "editor")]
                {
                    let f12 = winit::keyboard::KeyCode::F12;
                    if event.physical_key == PhysicalKey::Code(f12)
                        && event.state == ElementState::Pressed
                        && !event.repeat
                    {
                        if let Some(editor) = &mut self.editor {
                            editor.visible = !editor.visible;
                            let state = if editor.visible { "shown" } else { "hidden" };
                            log::info!("Editor {state}");
                        }
                    }
                }

                if let PhysicalKey::Code(key_code) = event.physical_key {
                    let input = self.world.resource_mut::<InputState>();
                    match event.state {
                        ElementState::Pressed => input.keys.press(key_code),
                        ElementState::Released => input.keys.release(key_code),
                    }
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                let input = self.world.resource_mut::<InputState>();
                match state {
                    ElementState::Pressed => input.mouse.press(button),
                    ElementState::Released => input.mouse.release(button),
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let cursor = self.world.resource_mut::<CursorPosition>();
                cursor.x = position.x as f32;
                cursor.y = position.y as f32;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.world.resource_mut::<InputState>().scroll += amount;
            }

            WindowEvent::RedrawRequested => {
                let time = self.world.resource_mut::<Time>();
                time.update();
                let dt = time.delta_secs();

                // Scenes tick before the pipeline so anything they spawn or
                // move is resolved and drawn this same frame.
                if let Some(mut scenes) = self.world.resource_remove::<SceneManager>() {
                    scenes.update(&mut self.world, dt);
                    self.world.insert_resource(scenes);
                }

                self.schedule.run(&mut self.world, dt);

                self.world.resource_mut::<InputState>().clear_frame();

                // Build editor UI before rendering so paint jobs are ready.
                #[cfg(feature = "editor")]
                {
                    if let Some(window) = &self.window {
                        if let Some(editor) = &mut self.editor {
                            editor.prepare(&mut self.world, window);
                        }
                    }
                }

                #[cfg(feature = "editor")]
                {
                    let editor = &mut self.editor;
                    render_world(event_loop, &mut self.world, |frame| {
                        if let Some(editor) = editor.as_mut() {
                            editor.paint(frame);
                        }
                    });
                }
                #[cfg(not(feature = "editor"))]
                {
                    render_world(event_loop, &mut self.world, |_| {});
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

/// Renders the world and recovers from surface errors.
fn render_world(
    event_loop: &ActiveEventLoop,
    world: &mut World,
    overlay: impl FnOnce(&mut FrameContext<'_>),
) {
    if !world.has_resource::<GpuContext>() {
        return;
    }
    match render_frame(world, overlay) {
        Ok(()) => {}
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            if let Some(gpu) = world.get_resource_mut::<GpuContext>() {
                let (width, height) = gpu.surface_size();
                gpu.resize(width, height);
            }
        }
        Err(wgpu::SurfaceError::OutOfMemory) => {
            log::error!("Out of GPU memory, exiting.");
            event_loop.exit();
        }
        Err(e) => {
            log::warn!("Surface error: {e:?}");
        }
    }
}
