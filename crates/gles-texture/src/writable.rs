//! A 2D texture with its own framebuffer, for render-to-texture.

use anyhow::{bail, ensure, Result};
use gl::types::GLenum;
use gles_core::{check_error, BindingTarget, GlDriver, ObjectId, Viewport, UNBOUND};
use gles_state::GlState;
use tracing::{debug, error};

use crate::format::InternalFormat;
use crate::renderer::Renderer;
use crate::texture::Texture;

/// Allocation options for [`WritableTexture`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WritableTextureOptions {
    /// Attach a 16-bit depth renderbuffer.
    pub has_depth: bool,
    /// Attach an 8-bit stencil renderbuffer.
    pub has_stencil: bool,
    pub internal_format: InternalFormat,
}

/// A texture that can be drawn into as well as sampled from.
///
/// Bind the framebuffer, draw, then unbind to restore whatever framebuffer
/// and viewport were active before:
///
/// ```rust,ignore
/// target.bind_framebuffer(&mut state);
/// render_scene(&mut state);
/// let pixels = target.read_pixels(&mut state)?;
/// target.unbind_framebuffer(&mut state, true);
/// ```
#[derive(Debug)]
pub struct WritableTexture {
    texture: Texture,
    width: i32,
    height: i32,
    framebuffer: ObjectId,
    depth: Option<ObjectId>,
    stencil: Option<ObjectId>,
    saved_framebuffer: ObjectId,
    saved_viewport: Viewport,
}

impl WritableTexture {
    /// Allocate the texture, framebuffer and requested renderbuffers, and
    /// clear the texture to transparent black.
    ///
    /// The previously bound framebuffer and viewport are restored before
    /// returning, on success and on failure.
    pub fn new<D: GlDriver>(
        state: &mut GlState<D>,
        width: i32,
        height: i32,
        options: WritableTextureOptions,
    ) -> Result<Self> {
        ensure!(
            width > 0 && height > 0,
            "writable texture must have a positive size, got {width}x{height}"
        );
        let max = state.max_texture_size();
        if max > 0 {
            ensure!(
                width <= max && height <= max,
                "{width}x{height} exceeds GL_MAX_TEXTURE_SIZE {max}"
            );
        }

        let saved_viewport = state.viewport();
        let saved_framebuffer = state.current_framebuffer();

        let texture = Texture::new(state);
        let framebuffer = state.driver_mut().gen_framebuffer();
        let mut this = Self {
            texture,
            width,
            height,
            framebuffer,
            depth: None,
            stencil: None,
            saved_framebuffer,
            saved_viewport,
        };

        let allocated = this.allocate(state, options);

        state.bind_framebuffer(saved_framebuffer);
        state.set_viewport(saved_viewport);

        match allocated {
            Ok(()) => {
                debug!(
                    texture = this.texture.name(),
                    framebuffer, width, height, ?options, "writable texture created"
                );
                Ok(this)
            }
            Err(err) => {
                this.destroy(state);
                Err(err)
            }
        }
    }

    fn allocate<D: GlDriver>(
        &mut self,
        state: &mut GlState<D>,
        options: WritableTextureOptions,
    ) -> Result<()> {
        let (width, height) = (self.width, self.height);
        let format = options.internal_format;

        self.texture.bind(state, 0);
        {
            let driver = state.driver_mut();
            driver.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
            driver.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
            driver.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
            driver.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
            driver.tex_image_2d(
                gl::TEXTURE_2D,
                format.gl_enum(),
                width,
                height,
                format.pixel_format(),
                format.component_type(),
            );
        }
        check_error(state.driver(), || {
            format!("glTexImage2D(GL_TEXTURE_2D, 0, {format:?}, {width}, {height})")
        })?;

        // Unbind before attaching, sampling an attached texture is undefined.
        self.texture.unbind(state);

        state.bind_framebuffer(self.framebuffer);
        state.driver_mut().framebuffer_texture_2d(
            gl::COLOR_ATTACHMENT0,
            gl::TEXTURE_2D,
            self.texture.name(),
        );
        check_error(state.driver(), || "glFramebufferTexture2D".to_owned())?;

        if options.has_depth {
            self.depth = Some(attach_renderbuffer(
                state.driver_mut(),
                gl::DEPTH_COMPONENT16,
                gl::DEPTH_ATTACHMENT,
                width,
                height,
            ));
        }
        if options.has_stencil {
            self.stencil = Some(attach_renderbuffer(
                state.driver_mut(),
                gl::STENCIL_INDEX8,
                gl::STENCIL_ATTACHMENT,
                width,
                height,
            ));
        }

        let status = state.driver().check_framebuffer_status();
        if status != gl::FRAMEBUFFER_COMPLETE {
            error!("Failed to make complete Framebuffer: 0x{status:x}");
            bail!("incomplete framebuffer: status 0x{status:x}");
        }

        let driver = state.driver_mut();
        driver.clear_color(0.0, 0.0, 0.0, 0.0);
        driver.clear_stencil(0);
        driver.clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT);
        Ok(())
    }

    pub fn name(&self) -> ObjectId {
        self.texture.name()
    }

    pub fn framebuffer(&self) -> ObjectId {
        self.framebuffer
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn has_depth(&self) -> bool {
        self.depth.is_some()
    }

    pub fn has_stencil(&self) -> bool {
        self.stencil.is_some()
    }

    /// Bind the colour texture for sampling on `unit`.
    pub fn bind<D: GlDriver>(&mut self, state: &mut GlState<D>, unit: u32) -> bool {
        self.texture.bind(state, unit)
    }

    pub fn unbind<D: GlDriver>(&mut self, state: &mut GlState<D>) -> bool {
        self.texture.unbind(state)
    }

    /// Make this texture the draw target.
    ///
    /// Remembers the current framebuffer and viewport, then binds this
    /// framebuffer with a viewport covering the whole texture.
    pub fn bind_framebuffer<D: GlDriver>(&mut self, state: &mut GlState<D>) {
        self.saved_viewport = state.viewport();
        self.saved_framebuffer = state.current_framebuffer();

        state.bind_framebuffer(self.framebuffer);
        state.set_viewport(Viewport::new(0, 0, self.width, self.height));
    }

    /// Stop drawing into this texture.
    ///
    /// With `restore_state`, rebinds the framebuffer and viewport saved by
    /// [`WritableTexture::bind_framebuffer`]; otherwise binds the default
    /// framebuffer and leaves the viewport alone.
    pub fn unbind_framebuffer<D: GlDriver>(&mut self, state: &mut GlState<D>, restore_state: bool) {
        if restore_state {
            state.bind_framebuffer(self.saved_framebuffer);
            state.set_viewport(self.saved_viewport);
        } else {
            state.bind_framebuffer(UNBOUND);
        }
    }

    /// Run `body` with this texture as the draw target.
    pub fn draw<D: GlDriver, R>(
        &mut self,
        state: &mut GlState<D>,
        body: impl FnOnce(&mut GlState<D>) -> R,
    ) -> R {
        self.bind_framebuffer(state);
        let result = body(state);
        self.unbind_framebuffer(state, true);
        result
    }

    /// Read the whole texture back as tightly packed RGBA8 rows, bottom row
    /// first.
    ///
    /// Binds the framebuffer for the read if it isn't bound already.
    pub fn read_pixels<D: GlDriver>(&mut self, state: &mut GlState<D>) -> Result<Vec<u8>> {
        let already_bound = state.bound(BindingTarget::Framebuffer) == Some(self.framebuffer);
        if !already_bound {
            self.bind_framebuffer(state);
        }

        let pixels = state
            .driver()
            .read_pixels_rgba(Viewport::new(0, 0, self.width, self.height));
        let checked = check_error(state.driver(), || "glReadPixels".to_owned());

        if !already_bound {
            self.unbind_framebuffer(state, true);
        }
        checked.map(|()| pixels)
    }

    /// Render this texture through `renderer` into a fresh writable texture
    /// of the same size and read the result back.
    ///
    /// This texture is bound on unit 0 for the draw; the caller provides the
    /// program that samples it. Afterwards it is back on the unit it was
    /// bound to before, or unbound.
    pub fn capture<D: GlDriver>(
        &mut self,
        state: &mut GlState<D>,
        renderer: &dyn Renderer<D>,
    ) -> Result<Vec<u8>> {
        let mut out = WritableTexture::new(
            state,
            self.width,
            self.height,
            WritableTextureOptions::default(),
        )?;

        let previous_unit = self.texture.bound_unit();
        self.texture.bind(state, 0);
        out.bind_framebuffer(state);
        renderer.render(state);
        let pixels = out.read_pixels(state);
        out.unbind_framebuffer(state, true);
        match previous_unit {
            Some(0) => {}
            Some(unit) => {
                self.texture.bind(state, unit);
            }
            None => {
                self.texture.unbind(state);
            }
        }
        out.destroy(state);

        pixels
    }

    /// Delete the texture, framebuffer and renderbuffers.
    ///
    /// If this framebuffer is bound the default framebuffer is bound first,
    /// matching what the driver does on deletion.
    pub fn destroy<D: GlDriver>(self, state: &mut GlState<D>) {
        if state.bound(BindingTarget::Framebuffer) == Some(self.framebuffer) {
            state.bind_framebuffer(UNBOUND);
        }
        self.texture.destroy(state);

        let driver = state.driver_mut();
        driver.delete_framebuffer(self.framebuffer);
        for renderbuffer in [self.depth, self.stencil].into_iter().flatten() {
            driver.delete_renderbuffer(renderbuffer);
        }
    }
}

fn attach_renderbuffer<D: GlDriver>(
    driver: &mut D,
    internal_format: GLenum,
    attachment: GLenum,
    width: i32,
    height: i32,
) -> ObjectId {
    let renderbuffer = driver.gen_renderbuffer();
    driver.bind_renderbuffer(renderbuffer);
    driver.renderbuffer_storage(internal_format, width, height);
    driver.bind_renderbuffer(UNBOUND);
    driver.framebuffer_renderbuffer(attachment, renderbuffer);
    renderbuffer
}
