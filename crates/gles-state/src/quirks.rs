//! Known driver misbehaviour keyed off `GL_RENDERER`.

/// Compensations required by the current driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverQuirks {
    /// Some drivers drop texture-image updates on `GL_TEXTURE_EXTERNAL_OES`
    /// unless the texture is bound again, even when it is already bound.
    pub external_texture_needs_rebind: bool,
}

impl DriverQuirks {
    /// Quirks for a driver identifying itself as `renderer`.
    pub fn from_renderer(renderer: &str) -> Self {
        Self {
            // ARM Mali Midgard family, e.g. "Mali-T760", "Mali-T880".
            external_texture_needs_rebind: renderer.contains("Mali-T"),
        }
    }

    /// Assume every known quirk. Used when the renderer can't be identified.
    pub fn worst_case() -> Self {
        Self {
            external_texture_needs_rebind: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mali_midgard_needs_rebind() {
        assert!(DriverQuirks::from_renderer("Mali-T880").external_texture_needs_rebind);
        assert!(DriverQuirks::from_renderer("ARM Mali-T760 MP8").external_texture_needs_rebind);
    }

    #[test]
    fn other_renderers_do_not() {
        assert!(!DriverQuirks::from_renderer("Adreno (TM) 640").external_texture_needs_rebind);
        assert!(!DriverQuirks::from_renderer("Mali-G78").external_texture_needs_rebind);
    }

    #[test]
    fn worst_case_assumes_rebind() {
        assert!(DriverQuirks::worst_case().external_texture_needs_rebind);
    }
}
