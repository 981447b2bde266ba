//! [`GlState`]: a mirror of GL binding points that skips redundant driver
//! calls.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use gles_core::{
    BindingTarget, BufferTarget, GlDriver, GlVersion, ObjectId, StringName, TextureTarget,
    TextureUnit, Viewport, UNBOUND,
};
use once_cell::unsync::OnceCell;
use tracing::{debug, trace};

use crate::listeners::{ResetListener, ResetListeners};
use crate::quirks::DriverQuirks;

/// Cached belief about the driver's binding state for one GL context.
///
/// Every tracked binding must go through this type; binding behind its back
/// through [`GlState::driver_mut`] makes the cache diverge from the driver.
/// Each binding point is either unknown (`None`, re-derived or re-issued on
/// next use) or holds the last value written through the cache.
///
/// Create one per context and call [`GlState::reset`] whenever that context
/// is lost or recreated. Not `Send`: it must stay on the rendering thread.
pub struct GlState<D: GlDriver> {
    driver: D,

    version: OnceCell<GlVersion>,
    extensions: OnceCell<HashSet<String>>,
    max_texture_size: OnceCell<i32>,
    viewport: OnceCell<Viewport>,
    quirks: OnceCell<DriverQuirks>,

    program: Option<ObjectId>,
    texture_unit: Option<TextureUnit>,
    framebuffer: Option<ObjectId>,
    array_buffer: Option<ObjectId>,
    element_array_buffer: Option<ObjectId>,
    vertex_array: Option<ObjectId>,
    blend: Option<bool>,
    textures: HashMap<(TextureTarget, TextureUnit), ObjectId>,
    attributes: HashMap<u32, bool>,

    listeners: ResetListeners,
}

/// Store `value` in `slot`, returning whether it changed.
fn update<T: PartialEq + Copy>(slot: &mut Option<T>, value: T) -> bool {
    if *slot == Some(value) {
        return false;
    }
    *slot = Some(value);
    true
}

impl<D: GlDriver> GlState<D> {
    /// Wrap `driver` with every binding point unknown.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            version: OnceCell::new(),
            extensions: OnceCell::new(),
            max_texture_size: OnceCell::new(),
            viewport: OnceCell::new(),
            quirks: OnceCell::new(),
            program: None,
            texture_unit: None,
            framebuffer: None,
            array_buffer: None,
            element_array_buffer: None,
            vertex_array: None,
            blend: None,
            textures: HashMap::new(),
            attributes: HashMap::new(),
            listeners: ResetListeners::default(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Raw driver access for calls that don't touch tracked binding points
    /// (texture parameters, renderbuffers, draws).
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    // -----------------------------------------------------------------------
    // Derived driver information
    // -----------------------------------------------------------------------

    /// API version from `GL_VERSION`, or [`GlVersion::Unknown`] if the
    /// driver doesn't report a parseable one. Unknown results are not
    /// memoized.
    pub fn gl_version(&self) -> GlVersion {
        if let Some(version) = self.version.get() {
            return *version;
        }
        let parsed = self
            .driver
            .get_string(StringName::Version)
            .map(|v| GlVersion::parse(&v))
            .unwrap_or(GlVersion::Unknown);
        if parsed.is_known() {
            debug!(%parsed, "GL version");
            let _ = self.version.set(parsed);
        }
        parsed
    }

    /// Whether `name` appears in the space separated `GL_EXTENSIONS` list.
    pub fn has_extension(&self, name: &str) -> bool {
        if let Some(extensions) = self.extensions.get() {
            return extensions.contains(name);
        }
        match self.driver.get_string(StringName::Extensions) {
            Some(list) => self
                .extensions
                .get_or_init(|| list.split_whitespace().map(str::to_owned).collect())
                .contains(name),
            None => false,
        }
    }

    pub fn max_texture_size(&self) -> i32 {
        *self
            .max_texture_size
            .get_or_init(|| self.driver.get_integer(gl::MAX_TEXTURE_SIZE))
    }

    /// The last viewport set through [`GlState::set_viewport`], or the
    /// driver's viewport if none was set since the last reset.
    pub fn viewport(&self) -> Viewport {
        *self.viewport.get_or_init(|| self.driver.get_viewport())
    }

    /// Quirks of the current driver.
    ///
    /// If the driver doesn't report a renderer, every quirk is assumed and
    /// the answer is not memoized, so a later call can still identify it.
    pub fn driver_quirks(&self) -> DriverQuirks {
        if let Some(quirks) = self.quirks.get() {
            return *quirks;
        }
        match self.driver.get_string(StringName::Renderer) {
            Some(renderer) => *self.quirks.get_or_init(|| {
                let quirks = DriverQuirks::from_renderer(&renderer);
                debug!(%renderer, ?quirks, "driver quirks");
                quirks
            }),
            None => DriverQuirks::worst_case(),
        }
    }

    // -----------------------------------------------------------------------
    // Cached bindings
    // -----------------------------------------------------------------------

    /// The object the cache believes is bound at `target`, `None` if unknown.
    pub fn bound(&self, target: BindingTarget) -> Option<ObjectId> {
        match target {
            BindingTarget::Texture { target, unit } => self.textures.get(&(target, unit)).copied(),
            BindingTarget::Buffer(BufferTarget::Array) => self.array_buffer,
            BindingTarget::Buffer(BufferTarget::ElementArray) => self.element_array_buffer,
            BindingTarget::VertexArray => self.vertex_array,
            BindingTarget::Framebuffer => self.framebuffer,
            BindingTarget::Program => self.program,
        }
    }

    pub fn active_texture_unit(&self) -> Option<TextureUnit> {
        self.texture_unit
    }

    pub fn blend_enabled(&self) -> Option<bool> {
        self.blend
    }

    pub fn attribute_enabled(&self, index: u32) -> Option<bool> {
        self.attributes.get(&index).copied()
    }

    /// The bound framebuffer, asking the driver if the cache doesn't know.
    pub fn current_framebuffer(&mut self) -> ObjectId {
        if let Some(framebuffer) = self.framebuffer {
            return framebuffer;
        }
        let framebuffer = self.driver.get_integer(gl::FRAMEBUFFER_BINDING) as ObjectId;
        self.framebuffer = Some(framebuffer);
        framebuffer
    }

    // -----------------------------------------------------------------------
    // Mutations. Each returns whether a driver call was issued.
    // -----------------------------------------------------------------------

    pub fn use_program(&mut self, program: ObjectId) -> bool {
        if !update(&mut self.program, program) {
            return false;
        }
        trace!(program, "glUseProgram");
        self.driver.use_program(program);
        true
    }

    pub fn set_active_texture_unit(&mut self, unit: TextureUnit) -> bool {
        if !update(&mut self.texture_unit, unit) {
            return false;
        }
        trace!(unit, "glActiveTexture");
        self.driver.active_texture(unit);
        true
    }

    /// Bind `texture` to `target` on `unit`.
    ///
    /// `unit` is always made the active unit first. The bind itself is
    /// skipped when already in place, except on external textures when the
    /// driver needs them rebound to see new image contents.
    pub fn bind_texture(
        &mut self,
        unit: TextureUnit,
        target: TextureTarget,
        texture: ObjectId,
    ) -> bool {
        self.set_active_texture_unit(unit);

        let stale = self.textures.get(&(target, unit)) != Some(&texture);
        let forced = !stale
            && target == TextureTarget::External
            && self.driver_quirks().external_texture_needs_rebind;
        if !stale && !forced {
            return false;
        }

        trace!(unit, ?target, texture, forced, "glBindTexture");
        self.driver.bind_texture(target.gl_enum(), texture);
        self.textures.insert((target, unit), texture);
        true
    }

    /// Record that `texture` was deleted.
    ///
    /// The driver reverts every binding of a deleted texture to 0, on every
    /// unit and target, so the cache does the same. No driver call is made.
    pub fn texture_deleted(&mut self, texture: ObjectId) {
        if texture == UNBOUND {
            return;
        }
        for bound in self.textures.values_mut() {
            if *bound == texture {
                *bound = UNBOUND;
            }
        }
    }

    pub fn bind_framebuffer(&mut self, framebuffer: ObjectId) -> bool {
        if !update(&mut self.framebuffer, framebuffer) {
            return false;
        }
        trace!(framebuffer, "glBindFramebuffer");
        self.driver.bind_framebuffer(framebuffer);
        true
    }

    pub fn bind_array_buffer(&mut self, buffer: ObjectId) -> bool {
        self.bind_buffer(BufferTarget::Array, buffer)
    }

    pub fn bind_element_array_buffer(&mut self, buffer: ObjectId) -> bool {
        self.bind_buffer(BufferTarget::ElementArray, buffer)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: ObjectId) -> bool {
        let slot = match target {
            BufferTarget::Array => &mut self.array_buffer,
            BufferTarget::ElementArray => &mut self.element_array_buffer,
        };
        if !update(slot, buffer) {
            return false;
        }
        trace!(?target, buffer, "glBindBuffer");
        self.driver.bind_buffer(target.gl_enum(), buffer);
        true
    }

    /// Requires core vertex arrays, see [`GlVersion::has_core_vertex_arrays`].
    pub fn bind_vertex_array(&mut self, array: ObjectId) -> bool {
        if !update(&mut self.vertex_array, array) {
            return false;
        }
        trace!(array, "glBindVertexArray");
        self.driver.bind_vertex_array(array);
        true
    }

    /// Enable or disable blending.
    ///
    /// Only the enabled flag is cached. The blend function is chosen on every
    /// off-to-on transition: premultiplied-alpha "over" when `translucent`,
    /// additive otherwise.
    pub fn set_blend(&mut self, enabled: bool, translucent: bool) -> bool {
        if !update(&mut self.blend, enabled) {
            return false;
        }
        trace!(enabled, translucent, "blend");
        self.driver.set_capability(gl::BLEND, enabled);
        if enabled {
            if translucent {
                self.driver.blend_func(gl::ONE, gl::ONE_MINUS_SRC_ALPHA);
            } else {
                self.driver.blend_func(gl::ONE, gl::ONE);
            }
        }
        true
    }

    pub fn set_attribute_enabled(&mut self, index: u32, enabled: bool) -> bool {
        if self.attributes.get(&index) == Some(&enabled) {
            return false;
        }
        trace!(index, enabled, "vertex attrib array");
        self.driver.set_vertex_attrib_array(index, enabled);
        self.attributes.insert(index, enabled);
        true
    }

    /// Set the viewport. Never deduplicated, so this always issues the call
    /// and returns true.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        self.driver.viewport(viewport);
        self.viewport = OnceCell::with_value(viewport);
        true
    }

    // -----------------------------------------------------------------------
    // Invalidation
    // -----------------------------------------------------------------------

    /// Register a listener run on every [`GlState::reset`]. Returns false if
    /// the same `Rc` was already registered.
    pub fn add_reset_listener(&mut self, listener: Rc<dyn ResetListener>) -> bool {
        self.listeners.add(listener)
    }

    /// Returns false if `listener` wasn't registered.
    pub fn remove_reset_listener(&mut self, listener: &Rc<dyn ResetListener>) -> bool {
        self.listeners.remove(listener)
    }

    /// Forget everything: every binding point becomes unknown, derived
    /// driver information is recomputed on next access, and reset listeners
    /// run in registration order.
    ///
    /// Returns the number of listeners that failed. Failures are logged and
    /// don't stop the remaining listeners.
    pub fn reset(&mut self) -> usize {
        debug!(listeners = self.listeners.len(), "Resetting state.");

        self.version.take();
        self.extensions.take();
        self.max_texture_size.take();
        self.viewport.take();
        self.quirks.take();

        self.program = None;
        self.texture_unit = None;
        self.framebuffer = None;
        self.array_buffer = None;
        self.element_array_buffer = None;
        self.vertex_array = None;
        self.blend = None;
        self.textures.clear();
        self.attributes.clear();

        self.listeners.notify()
    }
}
