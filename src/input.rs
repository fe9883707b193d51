use std::collections::HashSet;
use std::time::Instant;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Directional movement key identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
}

/// Polling view of the window system consumed by the camera each frame.
///
/// Everything the camera needs is behind this trait so it can be driven
/// by a scripted source in tests instead of a real window.
pub trait InputSource {
    /// Monotonic seconds since an arbitrary epoch
    fn time(&self) -> f64;

    /// Cursor position in window pixels, origin top-left
    fn cursor_position(&self) -> (f32, f32);

    /// Check if a directional key is currently held
    fn is_down(&self, key: MoveKey) -> bool;

    /// Current window size in physical pixels
    fn window_size(&self) -> (u32, u32);
}

/// Adapter that bridges Winit window events to the polling `InputSource`
#[derive(Debug, Clone)]
pub struct WinitInput {
    epoch: Instant,
    /// Currently pressed movement keys
    pressed: HashSet<MoveKey>,
    /// Last cursor position reported by the window system
    cursor: (f32, f32),
    window_size: (u32, u32),
}

impl WinitInput {
    /// Create a new adapter with no pressed keys and the cursor at the origin
    pub fn new(window_size: (u32, u32)) -> Self {
        Self {
            epoch: Instant::now(),
            pressed: HashSet::new(),
            cursor: (0.0, 0.0),
            window_size,
        }
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if let Some(key) = Self::keycode_to_move(keycode) {
                        match event.state {
                            ElementState::Pressed => {
                                self.pressed.insert(key);
                            }
                            ElementState::Released => {
                                self.pressed.remove(&key);
                            }
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
            }
            WindowEvent::Resized(size) => {
                self.window_size = (size.width, size.height);
            }
            _ => {}
        }
    }

    /// Map Winit KeyCode to a movement key; arrows and WASD both work
    fn keycode_to_move(keycode: KeyCode) -> Option<MoveKey> {
        match keycode {
            KeyCode::ArrowUp | KeyCode::KeyW => Some(MoveKey::Forward),
            KeyCode::ArrowDown | KeyCode::KeyS => Some(MoveKey::Backward),
            KeyCode::ArrowLeft | KeyCode::KeyA => Some(MoveKey::StrafeLeft),
            KeyCode::ArrowRight | KeyCode::KeyD => Some(MoveKey::StrafeRight),
            _ => None,
        }
    }
}

impl InputSource for WinitInput {
    fn time(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    fn cursor_position(&self) -> (f32, f32) {
        self.cursor
    }

    fn is_down(&self, key: MoveKey) -> bool {
        self.pressed.contains(&key)
    }

    fn window_size(&self) -> (u32, u32) {
        self.window_size
    }
}
