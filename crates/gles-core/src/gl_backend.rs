//! [`GlDriver`] implementation over the `gl` crate's global function table.

use std::ffi::{c_void, CStr};
use std::marker::PhantomData;
use std::sync::Once;

use gl::types::{GLenum, GLint, GLsizei, GLuint};

use crate::driver::{GlDriver, StringName};
use crate::types::{ObjectId, TextureUnit, Viewport};

pub(crate) static GL_INIT_ONCE: Once = Once::new();

/// The driver of the context current on the calling thread.
///
/// Not `Send`: GL contexts have thread affinity and so does this handle.
#[derive(Debug)]
pub struct GlesDriver {
    _not_send: PhantomData<*const ()>,
}

/// Run `load` unless function pointers were already loaded in this process.
/// Returns whether `load` ran.
fn load_once(load: impl FnOnce()) -> bool {
    let mut ran = false;
    GL_INIT_ONCE.call_once(|| {
        load();
        ran = true;
    });
    ran
}

impl GlesDriver {
    /// Load GL function pointers with `gl_loader` and wrap the current
    /// context.
    ///
    /// Only the first [`GlesDriver::load`] or [`GlesDriver::with_loader`]
    /// call in a process loads function pointers; later calls reuse them.
    pub fn load() -> Self {
        let loaded = load_once(|| {
            gl_loader::init_gl();
            gl::load_with(|s| gl_loader::get_proc_address(s).cast());
        });
        if loaded {
            tracing::debug!("GL function pointers loaded");
        }

        Self {
            _not_send: PhantomData,
        }
    }

    /// Load GL function pointers through a platform loader such as
    /// `eglGetProcAddress`, then wrap the current context.
    ///
    /// `loader` is ignored, with a warning, if pointers were already loaded.
    pub fn with_loader(loader: impl FnMut(&'static str) -> *const c_void) -> Self {
        if load_once(|| gl::load_with(loader)) {
            tracing::debug!("GL function pointers loaded through platform loader");
        } else {
            tracing::warn!("GL function pointers already loaded, ignoring platform loader");
        }

        Self {
            _not_send: PhantomData,
        }
    }
}

// SAFETY (all blocks below): a `GlesDriver` only exists after function
// pointers were loaded, and callers must keep the owning context current on
// this thread while they use it.
impl GlDriver for GlesDriver {
    fn get_string(&self, name: StringName) -> Option<String> {
        unsafe {
            let ptr = gl::GetString(name.gl_enum());
            if ptr.is_null() {
                return None;
            }
            Some(
                CStr::from_ptr(ptr.cast())
                    .to_string_lossy()
                    .into_owned(),
            )
        }
    }

    fn get_integer(&self, pname: GLenum) -> i32 {
        let mut value: GLint = 0;
        unsafe { gl::GetIntegerv(pname, &mut value) };
        value
    }

    fn get_viewport(&self) -> Viewport {
        let mut dims: [GLint; 4] = [0; 4];
        unsafe { gl::GetIntegerv(gl::VIEWPORT, dims.as_mut_ptr()) };
        Viewport::from_array(dims)
    }

    fn get_error(&self) -> GLenum {
        unsafe { gl::GetError() }
    }

    fn check_framebuffer_status(&self) -> GLenum {
        unsafe { gl::CheckFramebufferStatus(gl::FRAMEBUFFER) }
    }

    fn read_pixels_rgba(&self, rect: Viewport) -> Vec<u8> {
        let len = rect.width.max(0) as usize * rect.height.max(0) as usize * 4;
        let mut pixels = vec![0u8; len];
        if len == 0 {
            return pixels;
        }
        unsafe {
            gl::PixelStorei(gl::PACK_ALIGNMENT, 1);
            gl::ReadPixels(
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                pixels.as_mut_ptr().cast(),
            );
        }
        pixels
    }

    fn active_texture(&mut self, unit: TextureUnit) {
        unsafe { gl::ActiveTexture(gl::TEXTURE0 + unit) }
    }

    fn bind_texture(&mut self, target: GLenum, texture: ObjectId) {
        unsafe { gl::BindTexture(target, texture) }
    }

    fn bind_framebuffer(&mut self, framebuffer: ObjectId) {
        unsafe { gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer) }
    }

    fn bind_buffer(&mut self, target: GLenum, buffer: ObjectId) {
        unsafe { gl::BindBuffer(target, buffer) }
    }

    fn bind_vertex_array(&mut self, array: ObjectId) {
        unsafe { gl::BindVertexArray(array) }
    }

    fn bind_renderbuffer(&mut self, renderbuffer: ObjectId) {
        unsafe { gl::BindRenderbuffer(gl::RENDERBUFFER, renderbuffer) }
    }

    fn use_program(&mut self, program: ObjectId) {
        unsafe { gl::UseProgram(program) }
    }

    fn set_capability(&mut self, capability: GLenum, enabled: bool) {
        unsafe {
            if enabled {
                gl::Enable(capability);
            } else {
                gl::Disable(capability);
            }
        }
    }

    fn blend_func(&mut self, src: GLenum, dst: GLenum) {
        unsafe { gl::BlendFunc(src, dst) }
    }

    fn set_vertex_attrib_array(&mut self, index: u32, enabled: bool) {
        unsafe {
            if enabled {
                gl::EnableVertexAttribArray(index);
            } else {
                gl::DisableVertexAttribArray(index);
            }
        }
    }

    fn viewport(&mut self, viewport: Viewport) {
        unsafe { gl::Viewport(viewport.x, viewport.y, viewport.width, viewport.height) }
    }

    fn gen_texture(&mut self) -> ObjectId {
        let mut name: GLuint = 0;
        unsafe { gl::GenTextures(1, &mut name) };
        name
    }

    fn delete_texture(&mut self, texture: ObjectId) {
        unsafe { gl::DeleteTextures(1, &texture) }
    }

    fn gen_framebuffer(&mut self) -> ObjectId {
        let mut name: GLuint = 0;
        unsafe { gl::GenFramebuffers(1, &mut name) };
        name
    }

    fn delete_framebuffer(&mut self, framebuffer: ObjectId) {
        unsafe { gl::DeleteFramebuffers(1, &framebuffer) }
    }

    fn gen_renderbuffer(&mut self) -> ObjectId {
        let mut name: GLuint = 0;
        unsafe { gl::GenRenderbuffers(1, &mut name) };
        name
    }

    fn delete_renderbuffer(&mut self, renderbuffer: ObjectId) {
        unsafe { gl::DeleteRenderbuffers(1, &renderbuffer) }
    }

    fn tex_parameter(&mut self, target: GLenum, pname: GLenum, value: i32) {
        unsafe { gl::TexParameteri(target, pname, value) }
    }

    fn tex_image_2d(
        &mut self,
        target: GLenum,
        internal_format: GLenum,
        width: i32,
        height: i32,
        format: GLenum,
        ty: GLenum,
    ) {
        unsafe {
            gl::TexImage2D(
                target,
                0,
                internal_format as GLint,
                width as GLsizei,
                height as GLsizei,
                0,
                format,
                ty,
                std::ptr::null(),
            )
        }
    }

    fn renderbuffer_storage(&mut self, internal_format: GLenum, width: i32, height: i32) {
        unsafe { gl::RenderbufferStorage(gl::RENDERBUFFER, internal_format, width, height) }
    }

    fn framebuffer_texture_2d(&mut self, attachment: GLenum, target: GLenum, texture: ObjectId) {
        unsafe { gl::FramebufferTexture2D(gl::FRAMEBUFFER, attachment, target, texture, 0) }
    }

    fn framebuffer_renderbuffer(&mut self, attachment: GLenum, renderbuffer: ObjectId) {
        unsafe {
            gl::FramebufferRenderbuffer(gl::FRAMEBUFFER, attachment, gl::RENDERBUFFER, renderbuffer)
        }
    }

    fn tex_image_2d_pixels(
        &mut self,
        target: GLenum,
        internal_format: GLenum,
        width: i32,
        height: i32,
        format: GLenum,
        ty: GLenum,
        pixels: &[u8],
    ) {
        unsafe {
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            gl::TexImage2D(
                target,
                0,
                internal_format as GLint,
                width as GLsizei,
                height as GLsizei,
                0,
                format,
                ty,
                pixels.as_ptr().cast(),
            )
        }
    }

    fn generate_mipmap(&mut self, target: GLenum) {
        unsafe { gl::GenerateMipmap(target) }
    }

    fn gen_sampler(&mut self) -> ObjectId {
        let mut name: GLuint = 0;
        unsafe { gl::GenSamplers(1, &mut name) };
        name
    }

    fn delete_sampler(&mut self, sampler: ObjectId) {
        unsafe { gl::DeleteSamplers(1, &sampler) }
    }

    fn sampler_parameter(&mut self, sampler: ObjectId, pname: GLenum, value: i32) {
        unsafe { gl::SamplerParameteri(sampler, pname, value) }
    }

    fn bind_sampler(&mut self, unit: TextureUnit, sampler: ObjectId) {
        unsafe { gl::BindSampler(unit, sampler) }
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { gl::ClearColor(r, g, b, a) }
    }

    fn clear_stencil(&mut self, s: i32) {
        unsafe { gl::ClearStencil(s) }
    }

    fn clear(&mut self, mask: u32) {
        unsafe { gl::Clear(mask) }
    }

    fn vertex_attrib_pointer(&mut self, index: u32, size: i32, data: &'static [f32]) {
        unsafe { gl::VertexAttribPointer(index, size, gl::FLOAT, gl::FALSE, 0, data.as_ptr().cast()) }
    }

    fn draw_arrays(&mut self, mode: GLenum, first: i32, count: i32) {
        unsafe { gl::DrawArrays(mode, first, count) }
    }
}
