pub mod color;
pub mod framebuffer;
pub mod math;
pub mod mesh;
pub mod raster;
pub mod renderer;
pub mod scene;
pub mod shader;
