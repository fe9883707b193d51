pub mod camera;
pub mod cli;
pub mod input;
pub mod mesh;
pub mod renderer;
pub mod texture;
pub mod types;

pub use camera::CameraController;
pub use input::{InputSource, MoveKey, WinitInput};
