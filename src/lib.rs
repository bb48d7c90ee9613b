// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod ui;
pub mod utils;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Event, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, Window};

#[cfg(target_arch = "wasm32")]
use controller::{CollisionDetector, InputEvent, InputState, NavigationLoop, PointerLockState};
#[cfg(target_arch = "wasm32")]
use model::{Camera, RoomDescription, StaticColliderSet};
#[cfg(target_arch = "wasm32")]
use ui::MenuOverlay;
#[cfg(target_arch = "wasm32")]
use view::{render, GpuContext};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();
    let (window, document, canvas) = init_canvas(800, 600)?;
    setup_app(&window, &document, &canvas).await
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
) -> Result<(), JsValue> {
    // Initialize GPU
    let gpu = GpuContext::new(canvas, 800, 600)
        .await
        .map_err(|e| js_error(format!("GPU init failed: {e:?}")))?;

    let width = gpu.config.width;
    let height = gpu.config.height;

    // Declarative scene: geometry, artworks and lights in one description
    let room = RoomDescription::gallery();
    let room_mesh = utils::build_room_mesh(&room).upload(gpu.device.as_ref());

    let mut camera = Camera::new(width, height);
    camera.eye = room.spawn_vec();

    // Navigation state: camera, input, colliders in one structure
    let detector = CollisionDetector::new(StaticColliderSet::build(&room));
    let nav = Rc::new(RefCell::new(NavigationLoop::new(camera, InputState::new(), detector)));
    let menu = Rc::new(RefCell::new(MenuOverlay::new()));

    // Lock transitions drive menu visibility
    {
        let menu = menu.clone();
        nav.borrow_mut().input.pointer_lock.set_listener(move |state| {
            let show = state == PointerLockState::Unlocked;
            tracing::info!("pointer lock changed: {state:?}");
            menu.borrow_mut().visible = show;
        });
    }

    // Camera, lighting buffers & bind groups
    let camera_resources = render::create_camera_resources(gpu.device.as_ref());
    let cam_buf = camera_resources.camera_buffer;
    let cam_bgl = camera_resources.bind_group_layout;
    let cam_bg = camera_resources.camera_bind_group;

    let cam_uniform = render::CameraUniform {
        view_proj: nav.borrow().camera.view_proj().to_cols_array_2d(),
    };
    gpu.queue.as_ref().write_buffer(&cam_buf, 0, bytemuck::bytes_of(&cam_uniform));

    let lighting_buf = camera_resources.lighting_buffer;
    gpu.queue
        .as_ref()
        .write_buffer(&lighting_buf, 0, bytemuck::bytes_of(&render::LightingUniform::from_room(&room)));

    // Depth texture
    let (_depth_tex, depth_view) = render::create_depth_texture(gpu.device.as_ref(), width, height);
    let depth_view_cell: Rc<RefCell<wgpu::TextureView>> = Rc::new(RefCell::new(depth_view));

    let pipeline = render::create_room_pipeline(
        gpu.device.as_ref(),
        gpu.format,
        &cam_bgl,
        wgpu::TextureFormat::Depth32Float,
    );

    // egui setup
    let egui_ctx = egui::Context::default();
    let egui_renderer =
        egui_wgpu::Renderer::new(gpu.device.as_ref(), gpu.format, egui_wgpu::RendererOptions::default());
    let egui_events: Rc<RefCell<Vec<egui::Event>>> = Rc::new(RefCell::new(Vec::new()));

    setup_input_listeners(document, window, nav.clone(), egui_events.clone())?;

    let mut render_state = render::RenderState {
        format: gpu.format,
        alpha_mode: gpu.config.alpha_mode,
        width,
        height,
        pipeline,
        room_mesh,
        egui_renderer,
        egui_primitives: None,
        egui_full_output: None,
        egui_dpr: 1.0,
    };

    // Continuous redraw using requestAnimationFrame
    let f = RcCellCallback::new(window.clone(), {
        let window = window.clone();
        let canvas = canvas.clone();
        let nav = nav.clone();
        let menu = menu.clone();
        let egui_events = egui_events.clone();

        move || {
            let now = window.performance().map(|p| p.now()).unwrap_or(0.0);

            // One navigation tick per display refresh
            nav.borrow_mut().advance(now);

            handle_resize(&window, gpu.device.as_ref(), &gpu.surface, &mut render_state, &nav, &depth_view_cell);

            // Update camera uniform
            let cam_uniform = render::CameraUniform {
                view_proj: nav.borrow().camera.view_proj().to_cols_array_2d(),
            };
            gpu.queue.as_ref().write_buffer(&cam_buf, 0, bytemuck::bytes_of(&cam_uniform));

            // Build egui input from queued events
            let dpr = window.device_pixel_ratio() as f32;
            let mut raw_input = egui::RawInput::default();
            raw_input.time = Some(now / 1000.0);
            raw_input.screen_rect = Some(egui::Rect::from_min_size(
                egui::Pos2::new(0.0, 0.0),
                egui::vec2(render_state.width as f32 / dpr, render_state.height as f32 / dpr),
            ));
            raw_input.events.extend(egui_events.borrow_mut().drain(..));
            egui_ctx.set_pixels_per_point(dpr);

            let locked = nav.borrow().input.pointer_lock.is_locked();
            let mut menu_mut = menu.borrow_mut();
            let mut full_output = ui::build_ui(&egui_ctx, raw_input, &mut menu_mut, locked);

            // The play button requests pointer lock; the pointerlockchange
            // listener reports whether it was granted
            if menu_mut.take_start_request() {
                if let Ok(html_el) = canvas.clone().dyn_into::<HtmlElement>() {
                    html_el.request_pointer_lock();
                }
            }
            drop(menu_mut);

            let primitives = egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), dpr);
            render_state.egui_primitives = Some(primitives);
            render_state.egui_full_output = Some(full_output);
            render_state.egui_dpr = dpr;

            let dv = depth_view_cell.borrow();
            render_state.draw_frame(gpu.device.as_ref(), gpu.queue.as_ref(), &gpu.surface, &dv, &cam_bg);
        }
    });
    f.start();

    Ok(())
}

/// Setup all input event listeners with platform-agnostic abstractions
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    nav: Rc<RefCell<NavigationLoop>>,
    egui_events: Rc<RefCell<Vec<egui::Event>>>,
) -> Result<(), JsValue> {
    // Keyboard down
    {
        let nav = nav.clone();
        let document_for_exit = document.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let key = e.key();

            if key == "Escape" {
                document_for_exit.exit_pointer_lock();
            }

            // Prevent page scroll on navigation keys
            if matches!(
                key.as_str(),
                "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight"
                    | "w" | "a" | "s" | "d" | "W" | "A" | "S" | "D"
            ) {
                e.prevent_default();
            }

            nav.borrow_mut().input.process_event(&InputEvent::KeyDown(key));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let nav = nav.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            nav.borrow_mut().input.process_event(&InputEvent::KeyUp(e.key()));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss - clear all keys
    {
        let nav = nav.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            nav.borrow_mut().input.process_event(&InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Visibility change - clear all keys
    {
        let nav = nav.clone();
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            nav.borrow_mut().input.process_event(&InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
        visibility.forget();
    }

    // Pointer lock change - the only way the lock state machine transitions
    {
        let nav = nav.clone();
        let doc_pl = document.clone();
        let plc = Closure::wrap(Box::new(move |_e: Event| {
            let locked = doc_pl.pointer_lock_element().is_some();
            nav.borrow_mut().input.process_event(&InputEvent::PointerLockChanged { locked });
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("pointerlockchange", plc.as_ref().unchecked_ref())?;
        plc.forget();
    }

    // Mouse move: look input while locked, egui pointer otherwise
    {
        let nav = nav.clone();
        let egui_events_q = egui_events.clone();
        let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
            let mut nav = nav.borrow_mut();
            if nav.input.pointer_lock.is_locked() {
                let dx = e.movement_x() as f32;
                let dy = e.movement_y() as f32;
                nav.input.process_event(&InputEvent::MouseMove { dx, dy });
            } else {
                let px = e.client_x() as f32;
                let py = e.client_y() as f32;
                egui_events_q.borrow_mut().push(egui::Event::PointerMoved(egui::pos2(px, py)));
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
        mm.forget();
    }

    // Mouse buttons feed the menu while unlocked
    {
        let nav = nav.clone();
        let egui_events_q = egui_events.clone();
        let mousedown = Closure::wrap(Box::new(move |e: MouseEvent| {
            if !nav.borrow().input.pointer_lock.is_locked() && e.button() == 0 {
                egui_events_q.borrow_mut().push(egui::Event::PointerButton {
                    pos: egui::pos2(e.client_x() as f32, e.client_y() as f32),
                    button: egui::PointerButton::Primary,
                    pressed: true,
                    modifiers: egui::Modifiers::default(),
                });
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();
    }
    {
        let nav = nav.clone();
        let egui_events_q = egui_events.clone();
        let mouseup = Closure::wrap(Box::new(move |e: MouseEvent| {
            if !nav.borrow().input.pointer_lock.is_locked() && e.button() == 0 {
                egui_events_q.borrow_mut().push(egui::Event::PointerButton {
                    pos: egui::pos2(e.client_x() as f32, e.client_y() as f32),
                    button: egui::PointerButton::Primary,
                    pressed: false,
                    modifiers: egui::Modifiers::default(),
                });
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
        mouseup.forget();
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn handle_resize(
    window: &Window,
    device: &wgpu::Device,
    surface: &wgpu::Surface,
    render_state: &mut view::RenderState,
    nav: &Rc<RefCell<NavigationLoop>>,
    depth_view_cell: &Rc<RefCell<wgpu::TextureView>>,
) {
    if let (Ok(w), Ok(h)) = (window.inner_width(), window.inner_height()) {
        let nw = w.as_f64().unwrap_or(800.0) as u32;
        let nh = h.as_f64().unwrap_or(600.0) as u32;
        if (nw != render_state.width || nh != render_state.height) && nw > 0 && nh > 0 {
            nav.borrow_mut().camera.set_aspect(nw, nh);
            render_state.width = nw;
            render_state.height = nh;

            let config = wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format: render_state.format,
                width: nw,
                height: nh,
                present_mode: wgpu::PresentMode::Fifo,
                alpha_mode: render_state.alpha_mode,
                view_formats: vec![],
                desired_maximum_frame_latency: 2,
            };
            surface.configure(device, &config);

            let (_tex, depth_view) = view::render::create_depth_texture(device, nw, nh);
            *depth_view_cell.borrow_mut() = depth_view;
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn init_canvas(width: u32, height: u32) -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_width(width);
    canvas_el.set_height(height);
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            inner.borrow_mut().as_mut()();

            // Recursively schedule next frame
            let cb_ref = callback_clone.borrow();
            window
                .request_animation_frame(cb_ref.as_ref().unwrap().as_ref().unchecked_ref())
                .expect("RAF failed");
        }) as Box<dyn FnMut()>));

        self.window
            .request_animation_frame(callback.borrow().as_ref().unwrap().as_ref().unchecked_ref())
            .expect("RAF start failed");

        // Leak the closure to keep it alive
        std::mem::forget(callback);
    }
}
