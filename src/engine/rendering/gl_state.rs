use glow::HasContext;

/// Fixed-function state the underlay touches, captured so the UI pass that
/// follows sees what it left behind
#[derive(Debug, Clone)]
pub struct GlStateSnapshot {
    pub viewport: [i32; 4],
    pub depth_test_enabled: bool,
    pub blend_enabled: bool,
    pub cull_face_enabled: bool,
    pub depth_mask: bool,
}

impl GlStateSnapshot {
    pub fn capture(gl: &glow::Context) -> Self {
        unsafe {
            let mut viewport = [0i32; 4];
            gl.get_parameter_i32_slice(glow::VIEWPORT, &mut viewport);

            Self {
                viewport,
                depth_test_enabled: gl.is_enabled(glow::DEPTH_TEST),
                blend_enabled: gl.is_enabled(glow::BLEND),
                cull_face_enabled: gl.is_enabled(glow::CULL_FACE),
                depth_mask: gl.get_parameter_i32(glow::DEPTH_WRITEMASK) != 0,
            }
        }
    }

    pub fn restore(&self, gl: &glow::Context) {
        unsafe {
            gl.viewport(self.viewport[0], self.viewport[1], self.viewport[2], self.viewport[3]);
            set_capability(gl, glow::DEPTH_TEST, self.depth_test_enabled);
            set_capability(gl, glow::BLEND, self.blend_enabled);
            set_capability(gl, glow::CULL_FACE, self.cull_face_enabled);
            gl.depth_mask(self.depth_mask);
            gl.use_program(None);
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }
}

pub(crate) unsafe fn set_capability(gl: &glow::Context, capability: u32, enabled: bool) {
    if enabled {
        gl.enable(capability);
    } else {
        gl.disable(capability);
    }
}
