//! Pixel transfer metadata for texture internal formats.

use gl::types::GLenum;

/// Internal formats a [`crate::WritableTexture`] can be allocated with.
///
/// `Rgb` and `Rgba` are the unsized OpenGL ES 2.0 formats; the rest are the
/// sized OpenGL ES 3.0 formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InternalFormat {
    R8,
    R8Snorm,
    R16F,
    R32F,
    Rg8,
    Rg8Snorm,
    Rg16F,
    Rg32F,
    Rgb,
    Rgb8,
    Srgb8,
    Rgb8Snorm,
    Rgb16F,
    Rgb32F,
    #[default]
    Rgba,
    Rgba8,
    Srgb8Alpha8,
    Rgba8Snorm,
    Rgba16F,
    Rgba32F,
}

impl InternalFormat {
    pub fn gl_enum(self) -> GLenum {
        use InternalFormat::*;
        match self {
            R8 => gl::R8,
            R8Snorm => gl::R8_SNORM,
            R16F => gl::R16F,
            R32F => gl::R32F,
            Rg8 => gl::RG8,
            Rg8Snorm => gl::RG8_SNORM,
            Rg16F => gl::RG16F,
            Rg32F => gl::RG32F,
            Rgb => gl::RGB,
            Rgb8 => gl::RGB8,
            Srgb8 => gl::SRGB8,
            Rgb8Snorm => gl::RGB8_SNORM,
            Rgb16F => gl::RGB16F,
            Rgb32F => gl::RGB32F,
            Rgba => gl::RGBA,
            Rgba8 => gl::RGBA8,
            Srgb8Alpha8 => gl::SRGB8_ALPHA8,
            Rgba8Snorm => gl::RGBA8_SNORM,
            Rgba16F => gl::RGBA16F,
            Rgba32F => gl::RGBA32F,
        }
    }

    /// The `format` argument of `glTexImage2D` for this internal format.
    pub fn pixel_format(self) -> GLenum {
        use InternalFormat::*;
        match self {
            R8 | R8Snorm | R16F | R32F => gl::RED,
            Rg8 | Rg8Snorm | Rg16F | Rg32F => gl::RG,
            Rgb | Rgb8 | Srgb8 | Rgb8Snorm | Rgb16F | Rgb32F => gl::RGB,
            Rgba | Rgba8 | Srgb8Alpha8 | Rgba8Snorm | Rgba16F | Rgba32F => gl::RGBA,
        }
    }

    /// The `type` argument of `glTexImage2D` for this internal format.
    pub fn component_type(self) -> GLenum {
        use InternalFormat::*;
        match self {
            R16F | Rg16F | Rgb16F | Rgba16F => gl::HALF_FLOAT,
            R32F | Rg32F | Rgb32F | Rgba32F => gl::FLOAT,
            R8Snorm | Rg8Snorm | Rgb8Snorm | Rgba8Snorm => gl::BYTE,
            _ => gl::UNSIGNED_BYTE,
        }
    }

    /// True for the sized formats introduced by OpenGL ES 3.0.
    pub fn is_sized(self) -> bool {
        !matches!(self, InternalFormat::Rgb | InternalFormat::Rgba)
    }
}
