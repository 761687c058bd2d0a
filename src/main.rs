use std::collections::HashSet;
use std::num::NonZeroU32;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use log::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::engine::Engine;
use crate::player::MoveInput;
use crate::scaler::{ScaleLut, blit_scaled, build_scale_lut};

mod catalog;
mod engine;
mod map;
mod player;
mod raycast;
mod renderer;
mod scaler;

const MAP_DIR: &str = "maps";
const WINDOW_W: f64 = 1024.0;
const WINDOW_H: f64 = 768.0;

// Internal framebuffer height; width follows the window aspect ratio.
const FB_HEIGHT: usize = 400;
const FB_MIN_WIDTH: usize = 160;

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    engine: Engine,

    // Internal framebuffer the raycaster draws into, stretched to the
    // window on present.
    fb: Vec<u32>,
    fb_w: usize,
    scale_lut: ScaleLut,

    keys_down: HashSet<KeyCode>,
    last_tick: Instant,

    fps_frames: u32,
    fps_since: Instant,
}

impl Default for App {
    fn default() -> Self {
        Self {
            window: None,
            surface: None,
            engine: Engine::new(),
            fb: vec![0; FB_MIN_WIDTH * FB_HEIGHT],
            fb_w: FB_MIN_WIDTH,
            scale_lut: ScaleLut::empty(),
            keys_down: HashSet::new(),
            last_tick: Instant::now(),
            fps_frames: 0,
            fps_since: Instant::now(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("Raycaster Demo")
            .with_inner_size(LogicalSize::new(WINDOW_W, WINDOW_H));
        let window = Rc::new(event_loop.create_window(attributes).expect("create window"));

        let context = softbuffer::Context::new(window.clone()).expect("softbuffer context");
        self.surface =
            Some(softbuffer::Surface::new(&context, window.clone()).expect("softbuffer surface"));

        let size = window.inner_size();
        self.resize_framebuffer(size.width as usize, size.height as usize);

        window.request_redraw();
        self.window = Some(window);
        self.last_tick = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                    if !repeat {
                        self.handle_key_press(code, event_loop);
                    }
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => {
                self.tick();
                self.redraw(id);
            }

            WindowEvent::Resized(size) => {
                self.resize_framebuffer(size.width as usize, size.height as usize);
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl App {
    // Discrete key events: quit and map switching. Held-key movement goes
    // through the per-frame snapshot instead.
    fn handle_key_press(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        if code == KeyCode::Escape {
            event_loop.exit();
            return;
        }
        if let Some(index) = digit_index(code) {
            if let Err(e) = self.engine.activate_map(index) {
                warn!("map select: {e}");
            }
        }
    }

    // Advance the session by the wall-clock time since the last frame.
    fn tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        let down = |code| self.keys_down.contains(&code);
        let input = MoveInput {
            forward: down(KeyCode::KeyW) || down(KeyCode::ArrowUp),
            backward: down(KeyCode::KeyS) || down(KeyCode::ArrowDown),
            turn_left: down(KeyCode::KeyA) || down(KeyCode::ArrowLeft),
            turn_right: down(KeyCode::KeyD) || down(KeyCode::ArrowRight),
        };

        // The engine clamps dt, so a hitch cannot tunnel the player.
        self.engine.update(input, dt);
    }

    fn redraw(&mut self, id: WindowId) {
        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return,
        };

        let size = window.inner_size();
        let (dw, dh) = (size.width as usize, size.height as usize);
        if dw == 0 || dh == 0 {
            return; // Minimized window, skip drawing
        }

        surface
            .resize(
                NonZeroU32::new(dw as u32).unwrap(),
                NonZeroU32::new(dh as u32).unwrap(),
            )
            .unwrap();

        renderer::render_frame(
            &mut self.fb,
            self.fb_w,
            FB_HEIGHT,
            self.engine.active_map(),
            self.engine.player(),
        );

        let mut buf = surface.buffer_mut().expect("buffer_mut");
        blit_scaled(&mut buf, dw, &self.fb, self.fb_w, &self.scale_lut);
        buf.present().unwrap();

        window.request_redraw();
        self.count_frame();
    }

    fn count_frame(&mut self) {
        self.fps_frames += 1;
        let elapsed = self.fps_since.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            debug!("fps: {:.1}", self.fps_frames as f32 / elapsed);
            self.fps_frames = 0;
            self.fps_since = Instant::now();
        }
    }

    // Size the internal framebuffer to the window's aspect ratio and
    // rebuild the stretch LUT.
    fn resize_framebuffer(&mut self, dst_w: usize, dst_h: usize) {
        let aspect = if dst_h > 0 { dst_w as f64 / dst_h as f64 } else { 1.0 };
        let fb_w = ((FB_HEIGHT as f64 * aspect) as usize).max(FB_MIN_WIDTH);

        if fb_w != self.fb_w {
            self.fb_w = fb_w;
            self.fb = vec![0u32; fb_w * FB_HEIGHT];
        }
        self.scale_lut = build_scale_lut(dst_w, dst_h, fb_w, FB_HEIGHT);
    }
}

fn digit_index(code: KeyCode) -> Option<usize> {
    let index = match code {
        KeyCode::Digit1 => 0,
        KeyCode::Digit2 => 1,
        KeyCode::Digit3 => 2,
        KeyCode::Digit4 => 3,
        KeyCode::Digit5 => 4,
        KeyCode::Digit6 => 5,
        KeyCode::Digit7 => 6,
        KeyCode::Digit8 => 7,
        KeyCode::Digit9 => 8,
        _ => return None,
    };
    Some(index)
}

fn main() {
    env_logger::init();

    let mut app = App::default();
    let loaded = app.engine.load_maps_from(Path::new(MAP_DIR));
    if loaded > 0 {
        info!("loaded {loaded} maps; keys 1-{loaded} switch between them");
        // Start on the first loaded map rather than the built-in one.
        let _ = app.engine.activate_map(0);
    } else {
        info!("no maps loaded, using the built-in map");
    }

    let event_loop = EventLoop::new().expect("event loop");

    // Wait pauses the loop when idle; chaining request_redraw from
    // about_to_wait keeps frames coming without busy-waiting.
    event_loop.set_control_flow(ControlFlow::Wait);
    let _ = event_loop.run_app(&mut app);
}
