//! Shared vocabulary for binding points, object names and driver metadata.

use std::fmt;

use gl::types::GLenum;

/// A GL object name as returned by the `glGen*` family.
pub type ObjectId = u32;

/// Object name meaning "nothing bound" for every binding point.
pub const UNBOUND: ObjectId = 0;

/// Index of a texture sampling slot, `0..GL_MAX_COMBINED_TEXTURE_IMAGE_UNITS`.
pub type TextureUnit = u32;

/// `GL_TEXTURE_EXTERNAL_OES` from `OES_EGL_image_external`. Not part of the
/// desktop bindings generated for the `gl` crate.
pub const TEXTURE_EXTERNAL_OES: GLenum = 0x8D65;

/// Texture binding targets tracked per texture unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    /// Video/camera/canvas images imported from the platform compositor.
    External,
    CubeMap,
}

impl TextureTarget {
    pub fn gl_enum(self) -> GLenum {
        match self {
            TextureTarget::Texture2D => gl::TEXTURE_2D,
            TextureTarget::External => TEXTURE_EXTERNAL_OES,
            TextureTarget::CubeMap => gl::TEXTURE_CUBE_MAP,
        }
    }
}

/// Buffer binding targets with a single scalar binding each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

impl BufferTarget {
    pub fn gl_enum(self) -> GLenum {
        match self {
            BufferTarget::Array => gl::ARRAY_BUFFER,
            BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Every binding point whose object name is mirrored by the state cache.
///
/// Distinct keys have independent state: binding one never implies another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingTarget {
    Texture {
        target: TextureTarget,
        unit: TextureUnit,
    },
    Buffer(BufferTarget),
    VertexArray,
    Framebuffer,
    Program,
}

/// A viewport rectangle in window coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_array([x, y, width, height]: [i32; 4]) -> Self {
        Self::new(x, y, width, height)
    }

    pub fn to_array(self) -> [i32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// API flavour and version parsed from `GL_VERSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlVersion {
    Gles { major: u32, minor: u32 },
    Gl { major: u32, minor: u32 },
    Unknown,
}

impl GlVersion {
    /// Parse a `GL_VERSION` string.
    ///
    /// ES drivers report `"OpenGL ES <major>.<minor> <vendor info>"`, desktop
    /// drivers `"<major>.<minor>[.<release>] <vendor info>"`. Anything else is
    /// [`GlVersion::Unknown`].
    pub fn parse(version: &str) -> Self {
        let version = version.trim();
        if let Some(rest) = version.strip_prefix("OpenGL ES") {
            // ES 1.x reports "OpenGL ES-CM 1.1"
            let rest = rest.trim_start_matches(|c: char| c != ' ' && !c.is_ascii_digit());
            return match parse_major_minor(rest.trim_start()) {
                Some((major, minor)) => GlVersion::Gles { major, minor },
                None => GlVersion::Unknown,
            };
        }
        match parse_major_minor(version) {
            Some((major, minor)) => GlVersion::Gl { major, minor },
            None => GlVersion::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != GlVersion::Unknown
    }

    /// True for OpenGL ES 3.0 and later, which add vertex array objects and
    /// sized internal formats.
    pub fn is_gles3_or_later(self) -> bool {
        matches!(self, GlVersion::Gles { major, .. } if major >= 3)
    }

    /// Vertex array objects in core, reachable as `glBindVertexArray`.
    /// The `OES_vertex_array_object` extension doesn't count: its entry
    /// points carry the `OES` suffix.
    pub fn has_core_vertex_arrays(self) -> bool {
        match self {
            GlVersion::Gles { major, .. } | GlVersion::Gl { major, .. } => major >= 3,
            GlVersion::Unknown => false,
        }
    }

    /// Sampler objects: OpenGL ES 3.0 or OpenGL 3.3.
    pub fn has_sampler_objects(self) -> bool {
        match self {
            GlVersion::Gles { major, .. } => major >= 3,
            GlVersion::Gl { major, minor } => (major, minor) >= (3, 3),
            GlVersion::Unknown => false,
        }
    }
}

impl fmt::Display for GlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlVersion::Gles { major, minor } => write!(f, "OpenGL ES {major}.{minor}"),
            GlVersion::Gl { major, minor } => write!(f, "OpenGL {major}.{minor}"),
            GlVersion::Unknown => f.write_str("unknown"),
        }
    }
}

fn parse_major_minor(s: &str) -> Option<(u32, u32)> {
    let token = s.split_whitespace().next()?;
    let mut parts = token.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
