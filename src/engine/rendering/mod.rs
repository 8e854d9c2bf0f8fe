pub mod gl_state;
pub mod renderer;

pub use gl_state::GlStateSnapshot;
pub use renderer::{ draw_order, shader_header, GpuScene, SceneRenderer };
