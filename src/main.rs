use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use glam::Vec2;

mod config;
mod logging;
mod math;
mod renderer;
mod scene;
mod ui;

use config::{AppConfig, DEFAULT_CONFIG_PATH};
use renderer::mesh_buffers::max_renderable_level;
use renderer::{Camera, GpuState};
use scene::{Material, MeshCache, SceneDriver};
use ui::{
    PanelStats, UiActions, UiState, apply_theme, draw_help_overlay, draw_side_panel,
    draw_warning_modal,
};

#[derive(Default)]
struct InputState {
    forward: f32,
    right: f32,
    up: f32,
    mouse_captured: bool,
    mouse_delta: Vec2,
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    config: AppConfig,
    camera: Camera,
    driver: SceneDriver<MeshCache>,
    ui_state: UiState,
    input: InputState,

    last_frame: Instant,
    frame_count: u32,
    fps_timer: Instant,
    fps: f32,

    last_vsync_state: bool,
    fatal: Option<anyhow::Error>,
}

fn wall_clock_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

impl App {
    fn new(config: AppConfig, driver: SceneDriver<MeshCache>) -> Self {
        let mut camera = Camera::from_config(&config.camera);
        camera.set_aspect(config.window.width as f32, config.window.height as f32);

        Self {
            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            camera,
            driver,
            ui_state: UiState::from_config(&config),
            input: InputState::default(),

            last_frame: Instant::now(),
            frame_count: 0,
            fps_timer: Instant::now(),
            fps: 0.0,

            last_vsync_state: config.render.vsync,
            fatal: None,
            config,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> anyhow::Result<()> {
        let gpu = pollster::block_on(GpuState::new(window.clone(), self.config.render.vsync))
            .context("failed to initialize the GPU")?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        let size = window.inner_size();
        self.camera.set_aspect(size.width as f32, size.height as f32);

        self.driver
            .cap_max_level(max_renderable_level(gpu.device.limits().max_buffer_size));

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_count += 1;
        if self.fps_timer.elapsed().as_secs_f32() >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer.elapsed().as_secs_f32();
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        self.camera.set_mode(self.ui_state.camera_mode);
        self.camera
            .process_keyboard(self.input.forward, self.input.right, self.input.up, dt);

        if self.input.mouse_captured {
            self.camera.process_mouse_movement(self.input.mouse_delta);
        }
        self.input.mouse_delta = Vec2::ZERO;

        self.driver.tick(wall_clock_ms());
    }

    fn panel_stats(&self) -> PanelStats {
        let object = self.driver.current();
        let cache = self.driver.source().stats();
        PanelStats {
            fps: self.fps,
            display_level: self.driver.display_level(),
            max_display_level: self.driver.max_level() - 1,
            vertices: object.mesh.vertex_count(),
            faces: object.mesh.face_count(),
            cache_entries: cache.entries,
            cache_hits: cache.hits,
            cache_misses: cache.misses,
            rotating: self.driver.is_rotating(),
            at_floor: self.driver.at_floor(),
            at_ceiling: self.driver.at_ceiling(),
        }
    }

    /// Returns `false` when the frame hit an unrecoverable surface error.
    fn render(&mut self) -> bool {
        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return true;
        };

        let raw_input = egui_state.take_egui_input(window);

        let stats = self.panel_stats();
        let camera_pos = self.camera.position.to_array();
        let camera_mode = self.camera.mode;

        let mut ui_actions = UiActions::default();
        let mut modal_actions = UiActions::default();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_actions = draw_side_panel(ctx, &mut self.ui_state, &stats);
            modal_actions = draw_warning_modal(ctx, &self.ui_state);
            draw_help_overlay(ctx, camera_pos, camera_mode);
        });

        modal_actions.apply(&mut self.driver, &mut self.ui_state);
        ui_actions.apply(&mut self.driver, &mut self.ui_state);

        let Some(gpu) = &mut self.gpu else { return true };
        let Some(window) = &self.window else { return true };
        let Some(egui_state) = &mut self.egui_state else {
            return true;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return true;
        };

        egui_state.handle_platform_output(window, full_output.platform_output);

        if self.ui_state.vsync_enabled != self.last_vsync_state {
            gpu.set_vsync(self.ui_state.vsync_enabled);
            self.last_vsync_state = self.ui_state.vsync_enabled;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(gpu.size);
                return true;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory");
                return false;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("surface timeout, skipping frame");
                return true;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.update_camera(&self.camera);
        gpu.prepare_scene(self.driver.scene());

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        gpu.render_scene(&view, &mut encoder, self.ui_state.wireframe);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        window.request_redraw();
        true
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let value = if pressed { 1.0 } else { 0.0 };

        match key {
            KeyCode::KeyW | KeyCode::KeyZ => self.input.forward = value,
            KeyCode::KeyS => self.input.forward = -value,
            KeyCode::KeyA | KeyCode::KeyQ => self.input.right = -value,
            KeyCode::KeyD => self.input.right = value,
            KeyCode::Space => self.input.up = value,
            KeyCode::ShiftLeft | KeyCode::ControlLeft => self.input.up = -value,
            KeyCode::Escape if pressed => self.release_cursor(),
            _ => {}
        }
    }

    fn release_cursor(&mut self) {
        self.input.mouse_captured = false;
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(winit::window::CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(event_loop, anyhow::Error::new(err).context("failed to create window"));
                return;
            }
        };

        if let Err(err) = self.init_gpu(window) {
            self.fail(event_loop, err);
            return;
        }

        self.driver.start();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(egui_state) = &mut self.egui_state {
            if let Some(window) = &self.window {
                let response = egui_state.on_window_event(window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                let stats = self.driver.source().stats();
                log::info!(
                    "exiting ({} cached meshes, {} hits, {} misses)",
                    stats.entries,
                    stats.hits,
                    stats.misses
                );
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                    self.camera
                        .set_aspect(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(key, event.state == ElementState::Pressed);
                }
            }

            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                if state == ElementState::Pressed && !self.ui_state.is_blocked() {
                    self.input.mouse_captured = true;
                    if let Some(window) = &self.window {
                        let _ = window.set_cursor_grab(winit::window::CursorGrabMode::Confined);
                        window.set_cursor_visible(false);
                    }
                } else {
                    self.release_cursor();
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.camera.process_scroll(scroll);
            }

            WindowEvent::RedrawRequested => {
                self.update();
                if !self.render() {
                    self.fail(event_loop, anyhow::anyhow!("surface out of memory"));
                }
            }

            _ => {}
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: winit::event::DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.input.mouse_captured {
                self.input.mouse_delta.x += delta.0 as f32;
                self.input.mouse_delta.y += delta.1 as f32;
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    logging::init().context("failed to install logger")?;

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let driver = SceneDriver::new(&config.fractal, MeshCache::new(Material::FRACTAL))
        .context("failed to build the initial fractal")?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, driver);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
