//! A headless [`GlDriver`] that records every call.
//!
//! Queries are answered from scripted values. The recorder keeps just enough
//! state (framebuffer binding, viewport) for save/restore code to read back
//! what it wrote.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use gl::types::GLenum;

use crate::driver::{GlDriver, StringName};
use crate::types::{ObjectId, TextureUnit, Viewport};

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetString(StringName),
    GetInteger(GLenum),
    GetViewport,
    GetError,
    CheckFramebufferStatus,
    ReadPixels(Viewport),

    ActiveTexture(TextureUnit),
    BindTexture(GLenum, ObjectId),
    BindFramebuffer(ObjectId),
    BindBuffer(GLenum, ObjectId),
    BindVertexArray(ObjectId),
    BindRenderbuffer(ObjectId),
    UseProgram(ObjectId),
    SetCapability(GLenum, bool),
    BlendFunc(GLenum, GLenum),
    SetVertexAttribArray(u32, bool),
    Viewport(Viewport),

    GenTexture(ObjectId),
    DeleteTexture(ObjectId),
    GenFramebuffer(ObjectId),
    DeleteFramebuffer(ObjectId),
    GenRenderbuffer(ObjectId),
    DeleteRenderbuffer(ObjectId),
    TexParameter(GLenum, GLenum, i32),
    TexImage2D {
        target: GLenum,
        internal_format: GLenum,
        width: i32,
        height: i32,
        format: GLenum,
        ty: GLenum,
    },
    RenderbufferStorage(GLenum, i32, i32),
    FramebufferTexture2D(GLenum, GLenum, ObjectId),
    FramebufferRenderbuffer(GLenum, ObjectId),
    /// A pixel upload; only the byte count of the data is kept.
    UploadTexImage2D {
        target: GLenum,
        internal_format: GLenum,
        width: i32,
        height: i32,
        format: GLenum,
        ty: GLenum,
        len: usize,
    },
    GenerateMipmap(GLenum),
    GenSampler(ObjectId),
    DeleteSampler(ObjectId),
    SamplerParameter(ObjectId, GLenum, i32),
    BindSampler(TextureUnit, ObjectId),

    ClearColor([f32; 4]),
    ClearStencil(i32),
    Clear(u32),
    VertexAttribPointer(u32, i32),
    DrawArrays(GLenum, i32, i32),
}

impl Call {
    /// True for calls that change driver state, false for pure queries.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Call::GetString(_)
                | Call::GetInteger(_)
                | Call::GetViewport
                | Call::GetError
                | Call::CheckFramebufferStatus
                | Call::ReadPixels(_)
        )
    }
}

#[derive(Debug)]
pub struct RecordingDriver {
    calls: RefCell<Vec<Call>>,
    strings: HashMap<StringName, String>,
    integers: HashMap<GLenum, i32>,
    viewport: Viewport,
    framebuffer: ObjectId,
    framebuffer_status: GLenum,
    errors: RefCell<VecDeque<GLenum>>,
    next_name: Cell<ObjectId>,
    pixel: [u8; 4],
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDriver {
    /// A driver reporting an OpenGL ES 3.0 context on a generic renderer, a
    /// 2048 texture size limit, and a 0,0,1080,1920 viewport.
    pub fn new() -> Self {
        let strings = HashMap::from([
            (StringName::Vendor, "Recording".to_owned()),
            (StringName::Renderer, "Recording Renderer".to_owned()),
            (StringName::Version, "OpenGL ES 3.0 recording".to_owned()),
            (
                StringName::Extensions,
                "GL_OES_EGL_image_external GL_EXT_color_buffer_half_float".to_owned(),
            ),
        ]);
        let integers = HashMap::from([(gl::MAX_TEXTURE_SIZE, 2048)]);

        Self {
            calls: RefCell::new(Vec::new()),
            strings,
            integers,
            viewport: Viewport::new(0, 0, 1080, 1920),
            framebuffer: 0,
            framebuffer_status: gl::FRAMEBUFFER_COMPLETE,
            errors: RefCell::new(VecDeque::new()),
            next_name: Cell::new(1),
            pixel: [0, 0, 0, 0],
        }
    }

    /// Script a driver string. `None` makes `glGetString` return null.
    pub fn set_string(&mut self, name: StringName, value: Option<&str>) {
        match value {
            Some(value) => {
                self.strings.insert(name, value.to_owned());
            }
            None => {
                self.strings.remove(&name);
            }
        }
    }

    pub fn with_renderer(mut self, renderer: Option<&str>) -> Self {
        self.set_string(StringName::Renderer, renderer);
        self
    }

    pub fn with_version(mut self, version: Option<&str>) -> Self {
        self.set_string(StringName::Version, version);
        self
    }

    pub fn set_integer(&mut self, pname: GLenum, value: i32) {
        self.integers.insert(pname, value);
    }

    /// Change the driver-side viewport without recording a call, as a
    /// platform surface resize would.
    pub fn set_driver_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_framebuffer_status(&mut self, status: GLenum) {
        self.framebuffer_status = status;
    }

    /// Colour returned for every pixel by `read_pixels_rgba`.
    pub fn set_pixel(&mut self, rgba: [u8; 4]) {
        self.pixel = rgba;
    }

    /// Queue an error code for `glGetError`.
    pub fn push_error(&self, code: GLenum) {
        self.errors.borrow_mut().push_back(code);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: Call) {
        tracing::trace!(?call, "driver call");
        self.calls.borrow_mut().push(call);
    }

    fn gen_name(&self) -> ObjectId {
        let name = self.next_name.get();
        self.next_name.set(name + 1);
        name
    }
}

impl GlDriver for RecordingDriver {
    fn get_string(&self, name: StringName) -> Option<String> {
        self.record(Call::GetString(name));
        self.strings.get(&name).cloned()
    }

    fn get_integer(&self, pname: GLenum) -> i32 {
        self.record(Call::GetInteger(pname));
        if pname == gl::FRAMEBUFFER_BINDING {
            return self.framebuffer as i32;
        }
        self.integers.get(&pname).copied().unwrap_or(0)
    }

    fn get_viewport(&self) -> Viewport {
        self.record(Call::GetViewport);
        self.viewport
    }

    fn get_error(&self) -> GLenum {
        self.record(Call::GetError);
        self.errors.borrow_mut().pop_front().unwrap_or(gl::NO_ERROR)
    }

    fn check_framebuffer_status(&self) -> GLenum {
        self.record(Call::CheckFramebufferStatus);
        self.framebuffer_status
    }

    fn read_pixels_rgba(&self, rect: Viewport) -> Vec<u8> {
        self.record(Call::ReadPixels(rect));
        let count = rect.width.max(0) as usize * rect.height.max(0) as usize;
        self.pixel.repeat(count)
    }

    fn active_texture(&mut self, unit: TextureUnit) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&mut self, target: GLenum, texture: ObjectId) {
        self.record(Call::BindTexture(target, texture));
    }

    fn bind_framebuffer(&mut self, framebuffer: ObjectId) {
        self.record(Call::BindFramebuffer(framebuffer));
        self.framebuffer = framebuffer;
    }

    fn bind_buffer(&mut self, target: GLenum, buffer: ObjectId) {
        self.record(Call::BindBuffer(target, buffer));
    }

    fn bind_vertex_array(&mut self, array: ObjectId) {
        self.record(Call::BindVertexArray(array));
    }

    fn bind_renderbuffer(&mut self, renderbuffer: ObjectId) {
        self.record(Call::BindRenderbuffer(renderbuffer));
    }

    fn use_program(&mut self, program: ObjectId) {
        self.record(Call::UseProgram(program));
    }

    fn set_capability(&mut self, capability: GLenum, enabled: bool) {
        self.record(Call::SetCapability(capability, enabled));
    }

    fn blend_func(&mut self, src: GLenum, dst: GLenum) {
        self.record(Call::BlendFunc(src, dst));
    }

    fn set_vertex_attrib_array(&mut self, index: u32, enabled: bool) {
        self.record(Call::SetVertexAttribArray(index, enabled));
    }

    fn viewport(&mut self, viewport: Viewport) {
        self.record(Call::Viewport(viewport));
        self.viewport = viewport;
    }

    fn gen_texture(&mut self) -> ObjectId {
        let name = self.gen_name();
        self.record(Call::GenTexture(name));
        name
    }

    fn delete_texture(&mut self, texture: ObjectId) {
        self.record(Call::DeleteTexture(texture));
    }

    fn gen_framebuffer(&mut self) -> ObjectId {
        let name = self.gen_name();
        self.record(Call::GenFramebuffer(name));
        name
    }

    fn delete_framebuffer(&mut self, framebuffer: ObjectId) {
        self.record(Call::DeleteFramebuffer(framebuffer));
    }

    fn gen_renderbuffer(&mut self) -> ObjectId {
        let name = self.gen_name();
        self.record(Call::GenRenderbuffer(name));
        name
    }

    fn delete_renderbuffer(&mut self, renderbuffer: ObjectId) {
        self.record(Call::DeleteRenderbuffer(renderbuffer));
    }

    fn tex_parameter(&mut self, target: GLenum, pname: GLenum, value: i32) {
        self.record(Call::TexParameter(target, pname, value));
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
        self.record(Call::TexImage2D {
            target,
            internal_format,
            width,
            height,
            format,
            ty,
        });
    }

    fn renderbuffer_storage(&mut self, internal_format: GLenum, width: i32, height: i32) {
        self.record(Call::RenderbufferStorage(internal_format, width, height));
    }

    fn framebuffer_texture_2d(&mut self, attachment: GLenum, target: GLenum, texture: ObjectId) {
        self.record(Call::FramebufferTexture2D(attachment, target, texture));
    }

    fn framebuffer_renderbuffer(&mut self, attachment: GLenum, renderbuffer: ObjectId) {
        self.record(Call::FramebufferRenderbuffer(attachment, renderbuffer));
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
        self.record(Call::UploadTexImage2D {
            target,
            internal_format,
            width,
            height,
            format,
            ty,
            len: pixels.len(),
        });
    }

    fn generate_mipmap(&mut self, target: GLenum) {
        self.record(Call::GenerateMipmap(target));
    }

    fn gen_sampler(&mut self) -> ObjectId {
        let name = self.gen_name();
        self.record(Call::GenSampler(name));
        name
    }

    fn delete_sampler(&mut self, sampler: ObjectId) {
        self.record(Call::DeleteSampler(sampler));
    }

    fn sampler_parameter(&mut self, sampler: ObjectId, pname: GLenum, value: i32) {
        self.record(Call::SamplerParameter(sampler, pname, value));
    }

    fn bind_sampler(&mut self, unit: TextureUnit, sampler: ObjectId) {
        self.record(Call::BindSampler(unit, sampler));
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.record(Call::ClearColor([r, g, b, a]));
    }

    fn clear_stencil(&mut self, s: i32) {
        self.record(Call::ClearStencil(s));
    }

    fn clear(&mut self, mask: u32) {
        self.record(Call::Clear(mask));
    }

    fn vertex_attrib_pointer(&mut self, index: u32, size: i32, _data: &'static [f32]) {
        self.record(Call::VertexAttribPointer(index, size));
    }

    fn draw_arrays(&mut self, mode: GLenum, first: i32, count: i32) {
        self.record(Call::DrawArrays(mode, first, count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_framebuffer_and_viewport_writes() {
        let mut driver = RecordingDriver::new();
        driver.bind_framebuffer(7);
        driver.viewport(Viewport::new(0, 0, 16, 16));

        assert_eq!(driver.get_integer(gl::FRAMEBUFFER_BINDING), 7);
        assert_eq!(driver.get_viewport(), Viewport::new(0, 0, 16, 16));
        assert_eq!(driver.mutations().len(), 2);
        assert_eq!(driver.calls().len(), 4);
    }

    #[test]
    fn generated_names_are_unique_and_nonzero() {
        let mut driver = RecordingDriver::new();
        let a = driver.gen_texture();
        let b = driver.gen_framebuffer();
        assert_ne!(a, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn null_strings_are_scriptable() {
        let driver = RecordingDriver::new().with_renderer(None);
        assert_eq!(driver.get_string(StringName::Renderer), None);
    }
}
