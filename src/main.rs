use std::sync::Arc;
use std::time::Instant;

use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::{CursorGrabMode, Window},
};

// Import from the library crate
use roomwalk::{controller, logging, model, ui, utils, view};

use controller::{CollisionDetector, InputEvent, InputState, NavigationLoop, PointerLockState};
use model::{Camera, RoomDescription, StaticColliderSet};
use ui::MenuOverlay;
use view::{render, GpuContext, RenderState};

struct App {
    window: Arc<Window>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,

    render_state: RenderState,
    depth_view: wgpu::TextureView,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Navigation
    nav: NavigationLoop,
    menu: MenuOverlay,

    // Frame timing
    start_time: Instant,
}

impl App {
    async fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await;
        let device = gpu.device.clone();
        let queue = gpu.queue.clone();
        let config = gpu.config.clone();

        let depth_format = wgpu::TextureFormat::Depth32Float;
        let (_depth_texture, depth_view) =
            render::create_depth_texture(&device, size.width, size.height);

        // Scene and navigation. ROOM_FILE may point at a ron layout.
        let room = RoomDescription::from_env_or_gallery();
        let room_mesh = utils::build_room_mesh(&room).upload(&device);
        let mut camera = Camera::new(size.width, size.height);
        camera.eye = room.spawn_vec();
        let detector = CollisionDetector::new(StaticColliderSet::build(&room));
        let nav = NavigationLoop::new(camera, InputState::new(), detector);

        // Camera, lighting buffers & bind groups
        let camera_resources = render::create_camera_resources(&device);
        let camera_buffer = camera_resources.camera_buffer;
        let lighting_buffer = camera_resources.lighting_buffer;
        let camera_bgl = camera_resources.bind_group_layout;
        let camera_bind_group = camera_resources.camera_bind_group;

        let cam_uniform = render::CameraUniform {
            view_proj: nav.camera.view_proj().to_cols_array_2d(),
        };
        queue.write_buffer(&camera_buffer, 0, bytemuck::bytes_of(&cam_uniform));
        queue.write_buffer(
            &lighting_buffer,
            0,
            bytemuck::bytes_of(&render::LightingUniform::from_room(&room)),
        );

        let pipeline = render::create_room_pipeline(&device, config.format, &camera_bgl, depth_format);

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&device, config.format, egui_wgpu::RendererOptions::default());

        let render_state = RenderState {
            format: config.format,
            alpha_mode: config.alpha_mode,
            width: size.width,
            height: size.height,
            pipeline,
            room_mesh,
            egui_renderer,
            egui_primitives: None,
            egui_full_output: None,
            egui_dpr: window.scale_factor() as f32,
        };

        Self {
            window,
            device,
            queue,
            surface: gpu.surface,
            config,
            size,
            render_state,
            depth_view,
            camera_buffer,
            camera_bind_group,
            egui_state,
            egui_ctx,
            nav,
            menu: MenuOverlay::new(),
            start_time: Instant::now(),
        }
    }

    fn locked(&self) -> bool {
        self.nav.input.pointer_lock.is_locked()
    }

    /// Grab and hide the cursor, which is the closest native equivalent to
    /// the browser pointer lock.
    fn grab_cursor(&mut self) {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
            .is_ok();
        if grabbed {
            self.window.set_cursor_visible(false);
            self.nav
                .input
                .process_event(&InputEvent::PointerLockChanged { locked: true });
        } else {
            tracing::warn!("cursor grab denied");
        }
    }

    fn release_cursor(&mut self) {
        let _ = self.window.set_cursor_grab(CursorGrabMode::None);
        self.window.set_cursor_visible(true);
        self.nav
            .input
            .process_event(&InputEvent::PointerLockChanged { locked: false });
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // While the menu is up, egui gets first pick at events
        if !self.locked() {
            let response = self.egui_state.on_window_event(self.window.as_ref(), event);
            if response.consumed {
                return true;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent { state, logical_key, .. },
                ..
            } => {
                if logical_key == &Key::Named(NamedKey::Escape)
                    && *state == ElementState::Pressed
                    && self.locked()
                {
                    self.release_cursor();
                    return true;
                }
                if let Some(key) = key_name(logical_key) {
                    let event = match state {
                        ElementState::Pressed => InputEvent::KeyDown(key),
                        ElementState::Released => InputEvent::KeyUp(key),
                    };
                    self.nav.input.process_event(&event);
                }
                true
            }
            WindowEvent::Focused(false) => {
                self.nav.input.process_event(&InputEvent::FocusLost);
                true
            }
            _ => false,
        }
    }

    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        if self.locked() {
            self.nav.input.process_event(&InputEvent::MouseMove {
                dx: dx as f32,
                dy: dy as f32,
            });
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let (_tex, depth_view) =
                render::create_depth_texture(&self.device, new_size.width, new_size.height);
            self.depth_view = depth_view;

            self.render_state.width = new_size.width;
            self.render_state.height = new_size.height;
            self.nav.camera.set_aspect(new_size.width, new_size.height);
        }
    }

    fn redraw(&mut self) {
        let now_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        self.nav.advance(now_ms);

        let cam_uniform = render::CameraUniform {
            view_proj: self.nav.camera.view_proj().to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&cam_uniform));

        // UI. The menu mirrors the lock state, same as the web build.
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let locked = self.locked();
        self.menu.visible = !locked;
        let mut full_output = ui::build_ui(&self.egui_ctx, raw_input, &mut self.menu, locked);
        if self.menu.take_start_request() {
            self.grab_cursor();
        }
        self.egui_state
            .handle_platform_output(&self.window, std::mem::take(&mut full_output.platform_output));

        let dpr = self.window.scale_factor() as f32;
        let primitives = self
            .egui_ctx
            .tessellate(std::mem::take(&mut full_output.shapes), dpr);
        self.render_state.egui_primitives = Some(primitives);
        self.render_state.egui_full_output = Some(full_output);
        self.render_state.egui_dpr = dpr;

        self.render_state.draw_frame(
            &self.device,
            &self.queue,
            &self.surface,
            &self.depth_view,
            &self.camera_bind_group,
        );
    }
}

/// Map a winit logical key to the browser-style key name the bindings use.
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.to_string()),
        Key::Named(NamedKey::ArrowUp) => Some("ArrowUp".to_string()),
        Key::Named(NamedKey::ArrowDown) => Some("ArrowDown".to_string()),
        Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft".to_string()),
        Key::Named(NamedKey::ArrowRight) => Some("ArrowRight".to_string()),
        _ => None,
    }
}

fn main() {
    logging::init();

    let event_loop = EventLoop::new().unwrap();
    let window_attributes = Window::default_attributes()
        .with_title("Roomwalk")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    #[allow(deprecated)]
    let window = event_loop.create_window(window_attributes).unwrap();
    let window = Arc::new(window);

    let mut app = pollster::block_on(App::new(window.clone()));

    #[allow(deprecated)]
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { ref event, window_id } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            app.redraw();
                        }
                        _ => {}
                    }
                }
            }
            Event::DeviceEvent {
                event: winit::event::DeviceEvent::MouseMotion { delta },
                ..
            } => {
                app.handle_mouse_motion(delta.0, delta.1);
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        })
        .unwrap();
}
