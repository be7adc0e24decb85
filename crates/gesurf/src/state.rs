//! GPU state the tessellator reads and temporarily overrides.
use color::Rgba8;

/// Texture coordinate scale and offset applied when decoding vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvScale {
    pub u_scale: f32,
    pub v_scale: f32,
    pub u_off: f32,
    pub v_off: f32,
}

impl UvScale {
    pub const IDENTITY: Self = Self {
        u_scale: 1.0,
        v_scale: 1.0,
        u_off: 0.0,
        v_off: 0.0,
    };
}

impl Default for UvScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone)]
pub struct GpuState {
    pub uv: UvScale,
    /// Color given to control points without a color of their own.
    pub material_color: Rgba8,
}

impl Default for GpuState {
    fn default() -> Self {
        Self {
            uv: UvScale::IDENTITY,
            material_color: Rgba8::WHITE,
        }
    }
}

/// Replaces the texture coordinate scale with the identity for as long as it is alive.
///
/// Texture coordinates of the tessellated mesh have already been scaled while the control points
/// were decoded, so they must not be scaled again when the mesh is drawn. The previous value is
/// restored on drop.
pub struct UvOverride<'a> {
    uv: &'a mut UvScale,
    saved: Option<UvScale>,
}

impl<'a> UvOverride<'a> {
    /// Overrides the scale only if `active` is set.
    pub fn new(uv: &'a mut UvScale, active: bool) -> Self {
        let saved = active.then(|| std::mem::replace(uv, UvScale::IDENTITY));
        Self { uv, saved }
    }

    /// The scale in effect while the override is alive.
    #[inline(always)]
    pub fn current(&self) -> UvScale {
        *self.uv
    }
}

impl Drop for UvOverride<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self.uv = saved;
        }
    }
}
