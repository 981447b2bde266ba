//! Drawing strategies for filling the bound framebuffer.

use gles_core::{GlDriver, UNBOUND};
use gles_state::GlState;

/// Draws the current program into the bound framebuffer.
pub trait Renderer<D: GlDriver> {
    fn render(&self, state: &mut GlState<D>);
}

/// Available [`Renderer`] implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    /// [`QuadRenderer`].
    #[default]
    Quad,
}

impl RendererKind {
    pub fn build<D: GlDriver>(self) -> Box<dyn Renderer<D>> {
        match self {
            RendererKind::Quad => Box::new(QuadRenderer),
        }
    }
}

/// Full-screen quad as a triangle strip, clip-space `(x, y)` pairs.
static QUAD_VERTICES: [f32; 8] = [1.0, -1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 1.0];

/// Draws a full-screen quad from a client-side array on attribute 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadRenderer;

impl<D: GlDriver> Renderer<D> for QuadRenderer {
    fn render(&self, state: &mut GlState<D>) {
        // Client-side arrays need the default buffer and vertex array bound.
        state.bind_array_buffer(UNBOUND);
        if state.gl_version().has_core_vertex_arrays() {
            state.bind_vertex_array(UNBOUND);
        }

        state.set_attribute_enabled(0, true);
        state.driver_mut().vertex_attrib_pointer(0, 2, &QUAD_VERTICES);
        state.driver_mut().draw_arrays(gl::TRIANGLE_STRIP, 0, 4);
        state.set_attribute_enabled(0, false);
    }
}

#[cfg(test)]
mod tests {
    use gles_core::recording::{Call, RecordingDriver};
    use gles_core::StringName;

    use super::*;

    #[test]
    fn quad_draws_a_four_vertex_strip() {
        let mut state = GlState::new(RecordingDriver::new());
        let renderer: Box<dyn Renderer<RecordingDriver>> = RendererKind::Quad.build();
        renderer.render(&mut state);

        assert_eq!(
            state.driver().mutations(),
            vec![
                Call::BindBuffer(gl::ARRAY_BUFFER, UNBOUND),
                Call::BindVertexArray(UNBOUND),
                Call::SetVertexAttribArray(0, true),
                Call::VertexAttribPointer(0, 2),
                Call::DrawArrays(gl::TRIANGLE_STRIP, 0, 4),
                Call::SetVertexAttribArray(0, false),
            ]
        );
    }

    #[test]
    fn gles2_without_vao_extension_skips_vertex_array() {
        let driver = RecordingDriver::new().with_version(Some("OpenGL ES 2.0 build"));
        let mut state = GlState::new(driver);
        QuadRenderer.render(&mut state);
        assert_eq!(
            state
                .driver()
                .count(|c| matches!(c, Call::BindVertexArray(_))),
            0
        );
    }

    #[test]
    fn oes_vertex_array_extension_alone_skips_vertex_array() {
        let mut driver = RecordingDriver::new().with_version(Some("OpenGL ES 2.0 build"));
        driver.set_string(
            StringName::Extensions,
            Some("GL_OES_vertex_array_object GL_OES_EGL_image_external"),
        );
        let mut state = GlState::new(driver);
        QuadRenderer.render(&mut state);

        assert_eq!(
            state
                .driver()
                .count(|c| matches!(c, Call::BindVertexArray(_))),
            0
        );
        assert_eq!(
            state
                .driver()
                .count(|c| *c == Call::DrawArrays(gl::TRIANGLE_STRIP, 0, 4)),
            1
        );
    }

    #[test]
    fn desktop_gl_binds_default_vertex_array() {
        let driver = RecordingDriver::new().with_version(Some("4.6.0 NVIDIA 535.104.05"));
        let mut state = GlState::new(driver);
        QuadRenderer.render(&mut state);
        assert_eq!(
            state.driver().count(|c| *c == Call::BindVertexArray(UNBOUND)),
            1
        );
    }
}
