//! The graphics driver call surface.
//!
//! Everything above this layer talks to the driver through [`GlDriver`], so
//! the state cache and texture wrappers can run against the real context
//! ([`crate::GlesDriver`]) or a headless recorder in tests.

use gl::types::GLenum;

use crate::types::{ObjectId, TextureUnit, Viewport};

/// Driver strings readable through `glGetString`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringName {
    Vendor,
    Renderer,
    Version,
    Extensions,
}

impl StringName {
    pub fn gl_enum(self) -> GLenum {
        match self {
            StringName::Vendor => gl::VENDOR,
            StringName::Renderer => gl::RENDERER,
            StringName::Version => gl::VERSION,
            StringName::Extensions => gl::EXTENSIONS,
        }
    }
}

/// Raw driver calls used by this workspace.
///
/// Queries take `&self`; anything that changes driver state takes `&mut self`.
/// Implementations are only valid on the thread that owns the GL context.
pub trait GlDriver {
    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// `glGetString`. `None` when the driver returns a null pointer, which
    /// happens without a current context on some devices.
    fn get_string(&self, name: StringName) -> Option<String>;

    /// `glGetIntegerv` for single-valued parameters.
    fn get_integer(&self, pname: GLenum) -> i32;

    /// `glGetIntegerv(GL_VIEWPORT)`.
    fn get_viewport(&self) -> Viewport;

    /// `glGetError`. Pops one code off the driver's error queue.
    fn get_error(&self) -> GLenum;

    /// `glCheckFramebufferStatus(GL_FRAMEBUFFER)`.
    fn check_framebuffer_status(&self) -> GLenum;

    /// `glReadPixels` of `rect` from the bound framebuffer as tightly packed
    /// `GL_RGBA`/`GL_UNSIGNED_BYTE`.
    fn read_pixels_rgba(&self, rect: Viewport) -> Vec<u8>;

    // ---------------------------------------------------------------------
    // Binding state
    // ---------------------------------------------------------------------

    fn active_texture(&mut self, unit: TextureUnit);
    fn bind_texture(&mut self, target: GLenum, texture: ObjectId);
    fn bind_framebuffer(&mut self, framebuffer: ObjectId);
    fn bind_buffer(&mut self, target: GLenum, buffer: ObjectId);
    fn bind_vertex_array(&mut self, array: ObjectId);
    fn bind_renderbuffer(&mut self, renderbuffer: ObjectId);
    fn use_program(&mut self, program: ObjectId);
    /// `glEnable`/`glDisable`.
    fn set_capability(&mut self, capability: GLenum, enabled: bool);
    fn blend_func(&mut self, src: GLenum, dst: GLenum);
    /// `glEnableVertexAttribArray`/`glDisableVertexAttribArray`.
    fn set_vertex_attrib_array(&mut self, index: u32, enabled: bool);
    fn viewport(&mut self, viewport: Viewport);

    // ---------------------------------------------------------------------
    // Objects
    // ---------------------------------------------------------------------

    fn gen_texture(&mut self) -> ObjectId;
    fn delete_texture(&mut self, texture: ObjectId);
    fn gen_framebuffer(&mut self) -> ObjectId;
    fn delete_framebuffer(&mut self, framebuffer: ObjectId);
    fn gen_renderbuffer(&mut self) -> ObjectId;
    fn delete_renderbuffer(&mut self, renderbuffer: ObjectId);

    fn tex_parameter(&mut self, target: GLenum, pname: GLenum, value: i32);
    /// `glTexImage2D` at level 0 with no initial data.
    fn tex_image_2d(
        &mut self,
        target: GLenum,
        internal_format: GLenum,
        width: i32,
        height: i32,
        format: GLenum,
        ty: GLenum,
    );
    fn renderbuffer_storage(&mut self, internal_format: GLenum, width: i32, height: i32);
    fn framebuffer_texture_2d(&mut self, attachment: GLenum, target: GLenum, texture: ObjectId);
    fn framebuffer_renderbuffer(&mut self, attachment: GLenum, renderbuffer: ObjectId);

    /// `glTexImage2D` at level 0 from tightly packed client memory.
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d_pixels(
        &mut self,
        target: GLenum,
        internal_format: GLenum,
        width: i32,
        height: i32,
        format: GLenum,
        ty: GLenum,
        pixels: &[u8],
    );
    fn generate_mipmap(&mut self, target: GLenum);

    // Sampler objects need OpenGL ES 3.0 or OpenGL 3.3.
    fn gen_sampler(&mut self) -> ObjectId;
    fn delete_sampler(&mut self, sampler: ObjectId);
    fn sampler_parameter(&mut self, sampler: ObjectId, pname: GLenum, value: i32);
    fn bind_sampler(&mut self, unit: TextureUnit, sampler: ObjectId);

    // ---------------------------------------------------------------------
    // Drawing
    // ---------------------------------------------------------------------

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn clear_stencil(&mut self, s: i32);
    fn clear(&mut self, mask: u32);
    /// `glVertexAttribPointer` with a client-side float array.
    fn vertex_attrib_pointer(&mut self, index: u32, size: i32, data: &'static [f32]);
    fn draw_arrays(&mut self, mode: GLenum, first: i32, count: i32);
}
