//! Sampler objects and the filtering/wrapping vocabulary shared with
//! textures.

use anyhow::{ensure, Result};
use gl::types::GLenum;
use gles_core::{GlDriver, ObjectId, TextureUnit, UNBOUND};
use gles_state::GlState;

/// Texel filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
}

impl Filter {
    pub fn gl_enum(self) -> GLenum {
        match self {
            Filter::Nearest => gl::NEAREST,
            Filter::Linear => gl::LINEAR,
        }
    }

    /// Minification filter when sampling from a mipmap chain.
    pub fn mipmap_gl_enum(self) -> GLenum {
        match self {
            Filter::Nearest => gl::NEAREST_MIPMAP_NEAREST,
            Filter::Linear => gl::LINEAR_MIPMAP_LINEAR,
        }
    }
}

/// Texture coordinate wrapping, applied to both S and T.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    ClampToEdge,
    #[default]
    Repeat,
    MirroredRepeat,
}

impl Wrap {
    pub fn gl_enum(self) -> GLenum {
        match self {
            Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
            Wrap::Repeat => gl::REPEAT,
            Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerOptions {
    pub filter: Filter,
    /// Minify through the mipmap chain.
    pub mipmap: bool,
    pub wrap: Wrap,
}

impl Default for SamplerOptions {
    /// Linear, mipmapped, repeating.
    fn default() -> Self {
        Self {
            filter: Filter::Linear,
            mipmap: true,
            wrap: Wrap::Repeat,
        }
    }
}

/// A sampler object, overriding the sampling parameters of whatever texture
/// is bound on the units it is bound to.
///
/// Sampler bindings are not tracked by [`GlState`]; every [`Sampler::bind`]
/// reaches the driver.
#[derive(Debug)]
pub struct Sampler {
    name: ObjectId,
    options: SamplerOptions,
}

impl Sampler {
    /// Create a sampler. Fails on contexts without sampler objects.
    pub fn new<D: GlDriver>(state: &mut GlState<D>, options: SamplerOptions) -> Result<Self> {
        let version = state.gl_version();
        ensure!(
            version.has_sampler_objects(),
            "sampler objects need OpenGL ES 3.0 or OpenGL 3.3, context is {version}"
        );

        let min_filter = if options.mipmap {
            options.filter.mipmap_gl_enum()
        } else {
            options.filter.gl_enum()
        };

        let driver = state.driver_mut();
        let name = driver.gen_sampler();
        driver.sampler_parameter(name, gl::TEXTURE_MIN_FILTER, min_filter as i32);
        driver.sampler_parameter(name, gl::TEXTURE_MAG_FILTER, options.filter.gl_enum() as i32);
        driver.sampler_parameter(name, gl::TEXTURE_WRAP_S, options.wrap.gl_enum() as i32);
        driver.sampler_parameter(name, gl::TEXTURE_WRAP_T, options.wrap.gl_enum() as i32);
        tracing::debug!(name, ?options, "sampler created");

        Ok(Self { name, options })
    }

    pub fn name(&self) -> ObjectId {
        self.name
    }

    pub fn options(&self) -> SamplerOptions {
        self.options
    }

    pub fn bind<D: GlDriver>(&self, state: &mut GlState<D>, unit: TextureUnit) {
        state.driver_mut().bind_sampler(unit, self.name);
    }

    /// Restore texture-owned sampling on `unit`.
    pub fn unbind<D: GlDriver>(state: &mut GlState<D>, unit: TextureUnit) {
        state.driver_mut().bind_sampler(unit, UNBOUND);
    }

    pub fn destroy<D: GlDriver>(self, state: &mut GlState<D>) {
        state.driver_mut().delete_sampler(self.name);
        tracing::debug!(name = self.name, "sampler destroyed");
    }
}
