//! A texture object name bound through the state cache.

use gles_core::{BindingTarget, GlDriver, ObjectId, TextureTarget, TextureUnit, UNBOUND};
use gles_state::GlState;

/// One texture object, remembering the unit it was last bound to.
///
/// Textures don't delete themselves on drop; call [`Texture::destroy`] while
/// the owning context is current.
#[derive(Debug)]
pub struct Texture {
    name: ObjectId,
    target: TextureTarget,
    bound_unit: Option<TextureUnit>,
}

impl Texture {
    /// Allocate a `GL_TEXTURE_2D` texture name.
    pub fn new<D: GlDriver>(state: &mut GlState<D>) -> Self {
        Self::with_target(state, TextureTarget::Texture2D)
    }

    pub fn with_target<D: GlDriver>(state: &mut GlState<D>, target: TextureTarget) -> Self {
        let name = state.driver_mut().gen_texture();
        tracing::debug!(name, ?target, "texture created");
        Self {
            name,
            target,
            bound_unit: None,
        }
    }

    pub fn name(&self) -> ObjectId {
        self.name
    }

    pub fn target(&self) -> TextureTarget {
        self.target
    }

    pub fn bound_unit(&self) -> Option<TextureUnit> {
        self.bound_unit
    }

    /// Bind to `unit`. Returns whether `glBindTexture` was issued.
    ///
    /// A texture tracks one unit: if it was bound elsewhere, that unit is
    /// unbound first.
    pub fn bind<D: GlDriver>(&mut self, state: &mut GlState<D>, unit: TextureUnit) -> bool {
        if let Some(previous) = self.bound_unit.replace(unit) {
            if previous != unit {
                self.unbind_unit(state, previous);
            }
        }
        state.bind_texture(unit, self.target, self.name)
    }

    /// Unbind from the unit this texture was last bound to, if any.
    pub fn unbind<D: GlDriver>(&mut self, state: &mut GlState<D>) -> bool {
        match self.bound_unit.take() {
            Some(unit) => self.unbind_unit(state, unit),
            None => false,
        }
    }

    /// Bind 0 on `unit` unless something else was bound there since.
    fn unbind_unit<D: GlDriver>(&self, state: &mut GlState<D>, unit: TextureUnit) -> bool {
        let slot = BindingTarget::Texture {
            target: self.target,
            unit,
        };
        if state.bound(slot) != Some(self.name) {
            return false;
        }
        state.bind_texture(unit, self.target, UNBOUND)
    }

    /// Delete the texture name.
    ///
    /// Deleting a bound texture silently reverts its bindings to 0 in the
    /// driver; the cache is told so it keeps agreeing.
    pub fn destroy<D: GlDriver>(mut self, state: &mut GlState<D>) {
        self.unbind(state);
        state.driver_mut().delete_texture(self.name);
        state.texture_deleted(self.name);
        tracing::debug!(name = self.name, "texture destroyed");
    }
}

#[cfg(test)]
mod tests {
    use gles_core::recording::{Call, RecordingDriver};

    use super::*;

    #[test]
    fn bind_and_unbind_track_the_unit() {
        let mut state = GlState::new(RecordingDriver::new());
        let mut texture = Texture::new(&mut state);

        assert!(texture.bind(&mut state, 2));
        assert_eq!(texture.bound_unit(), Some(2));
        assert!(texture.unbind(&mut state));
        assert_eq!(texture.bound_unit(), None);
        assert!(!texture.unbind(&mut state));

        assert_eq!(
            state.bound(BindingTarget::Texture {
                target: TextureTarget::Texture2D,
                unit: 2
            }),
            Some(UNBOUND)
        );
    }

    #[test]
    fn destroy_unbinds_before_deleting() {
        let mut state = GlState::new(RecordingDriver::new());
        let mut texture = Texture::new(&mut state);
        let name = texture.name();
        texture.bind(&mut state, 0);
        texture.destroy(&mut state);

        let calls = state.driver().mutations();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[
                Call::BindTexture(gl::TEXTURE_2D, UNBOUND),
                Call::DeleteTexture(name)
            ]
        );
    }

    fn bound_on(state: &GlState<RecordingDriver>, unit: TextureUnit) -> Option<ObjectId> {
        state.bound(BindingTarget::Texture {
            target: TextureTarget::Texture2D,
            unit,
        })
    }

    #[test]
    fn rebinding_on_another_unit_releases_the_first() {
        let mut state = GlState::new(RecordingDriver::new());
        let mut texture = Texture::new(&mut state);
        let name = texture.name();

        texture.bind(&mut state, 1);
        texture.bind(&mut state, 2);
        assert_eq!(texture.bound_unit(), Some(2));
        assert_eq!(bound_on(&state, 1), Some(UNBOUND));
        assert_eq!(bound_on(&state, 2), Some(name));
    }

    #[test]
    fn unbind_leaves_a_unit_rebound_by_someone_else() {
        let mut state = GlState::new(RecordingDriver::new());
        let mut texture = Texture::new(&mut state);
        texture.bind(&mut state, 1);
        state.bind_texture(1, TextureTarget::Texture2D, 99);

        assert!(!texture.unbind(&mut state));
        assert_eq!(bound_on(&state, 1), Some(99));
    }

    #[test]
    fn destroy_clears_every_unit_holding_the_name() {
        let mut state = GlState::new(RecordingDriver::new());
        let mut texture = Texture::new(&mut state);
        let name = texture.name();
        texture.bind(&mut state, 1);
        texture.bind(&mut state, 2);
        // Bound directly through the cache, outside the texture's tracking.
        state.bind_texture(4, TextureTarget::Texture2D, name);

        texture.destroy(&mut state);
        for unit in [1, 2, 4] {
            assert_eq!(bound_on(&state, unit), Some(UNBOUND));
        }

        // The driver may hand the name out again; binding it must not be
        // skipped.
        assert!(state.bind_texture(1, TextureTarget::Texture2D, name));
        assert!(state.bind_texture(4, TextureTarget::Texture2D, name));
    }
}
