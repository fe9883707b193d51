// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "cube-viewer")]
#[command(about = "Textured mesh viewer with a free-look camera", long_about = None)]
pub struct Cli {
    /// OBJ mesh to load instead of the built-in cube
    #[arg(long)]
    pub mesh: Option<PathBuf>,

    /// BMP texture to apply instead of the generated checkerboard
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Draw triangle edges instead of filled faces
    #[arg(long, default_value = "false")]
    pub wireframe: bool,
}
