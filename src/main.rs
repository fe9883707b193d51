use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use cube_viewer::camera::CameraController;
use cube_viewer::cli::Cli;
use cube_viewer::input::WinitInput;
use cube_viewer::mesh::{self, MeshData};
use cube_viewer::renderer::Renderer;
use cube_viewer::texture::{self, TextureData};

const INITIAL_WINDOW_WIDTH: u32 = 640;
const INITIAL_WINDOW_HEIGHT: u32 = 480;
const FPS_UPDATE_INTERVAL: f32 = 1.0;
const CHECKERBOARD_SIZE: u32 = 64;
const CHECKERBOARD_CELL: u32 = 8;

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    camera: CameraController<WinitInput>,
    mesh: MeshData,
    texture: TextureData,
    last_frame_time: Instant,
    frame_count: u32,
    fps: f32,
    fps_update_timer: f32,
}

impl App {
    fn new(cli: Cli, mesh: MeshData, texture: TextureData) -> Self {
        let input = WinitInput::new((INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT));
        Self {
            cli,
            window: None,
            renderer: None,
            camera: CameraController::new(input),
            mesh,
            texture,
            last_frame_time: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            fps_update_timer: 0.0,
        }
    }

    fn update_fps(&mut self, delta: f32) {
        self.frame_count += 1;
        self.fps_update_timer += delta;

        if self.fps_update_timer >= FPS_UPDATE_INTERVAL {
            self.fps = self.frame_count as f32 / self.fps_update_timer;
            println!("FPS: {:.1}", self.fps);
            self.frame_count = 0;
            self.fps_update_timer = 0.0;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window = match event_loop.create_window(
                Window::default_attributes()
                    .with_title("Cube Viewer")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        INITIAL_WINDOW_WIDTH,
                        INITIAL_WINDOW_HEIGHT,
                    )),
            ) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            // Keep the cursor inside the window so look deltas keep
            // arriving as absolute positions
            window.set_cursor_visible(false);
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::Confined) {
                log::warn!("cursor confinement unavailable: {}", e);
            }

            let renderer = match pollster::block_on(Renderer::new(
                window.clone(),
                &self.mesh,
                &self.texture,
                self.cli.wireframe,
            )) {
                Ok(r) => r,
                Err(e) => {
                    log::error!("failed to initialize renderer: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            self.window = Some(window);
            self.renderer = Some(renderer);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.camera.input_mut().process_event(&event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta = now.duration_since(self.last_frame_time).as_secs_f32();
                self.last_frame_time = now;

                self.update_fps(delta);
                self.camera.update();

                if let Some(renderer) = &mut self.renderer {
                    if let Err(e) = renderer.render(
                        self.camera.projection_matrix(),
                        self.camera.view_matrix(),
                    ) {
                        log::error!("render error: {}", e);
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Load the requested mesh, falling back to the built-in cube
fn load_mesh(cli: &Cli) -> MeshData {
    match &cli.mesh {
        Some(path) => match mesh::load_obj(path) {
            Ok(m) => {
                log::info!("loaded {} vertices from {}", m.vertex_count(), path.display());
                m
            }
            Err(e) => {
                log::warn!("{:#}; using built-in cube", e);
                MeshData::unit_cube()
            }
        },
        None => MeshData::unit_cube(),
    }
}

/// Load the requested texture, falling back to a checkerboard
fn load_texture(cli: &Cli) -> TextureData {
    match &cli.texture {
        Some(path) => match texture::load_bmp(path) {
            Ok(t) => {
                log::info!("loaded {}x{} texture from {}", t.width, t.height, path.display());
                t
            }
            Err(e) => {
                log::warn!("{:#}; using checkerboard", e);
                TextureData::checkerboard(CHECKERBOARD_SIZE, CHECKERBOARD_CELL)
            }
        },
        None => TextureData::checkerboard(CHECKERBOARD_SIZE, CHECKERBOARD_CELL),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mesh = load_mesh(&cli);
    let texture = load_texture(&cli);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli, mesh, texture);

    println!("Cube Viewer - Controls: WASD/arrows to move, mouse to look, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
