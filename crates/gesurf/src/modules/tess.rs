//! Hardware tessellation module interface.

/// Number of floats between consecutive control points in each buffer handed to
/// [`TessModule::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strides {
    pub position: usize,
    pub tex_coords: usize,
    pub color: usize,
}

impl Strides {
    /// Whether every attribute fits in its stride.
    pub fn is_valid(&self) -> bool {
        self.position >= 3 && self.tex_coords >= 2 && self.color >= 4
    }
}

impl Default for Strides {
    fn default() -> Self {
        Self {
            position: 4,
            tex_coords: 4,
            color: 4,
        }
    }
}

/// Control point data of a hardware tessellated draw.
#[derive(Debug, Clone, Copy)]
pub struct ControlData<'a> {
    /// Number of control points.
    pub count: usize,
    /// `count` positions, `x, y, z` at each position stride.
    pub positions: &'a [f32],
    /// `count` texture coordinates, `u, v` at each texture coordinate stride. Only present if the
    /// control points have texture coordinates.
    pub tex_coords: Option<&'a [f32]>,
    /// `count` colors as `r, g, b, a` at each color stride if the control points have colors.
    /// Otherwise, a single color used for the whole surface.
    pub colors: &'a [f32],
    pub has_color: bool,
}

/// Trait for hardware tessellation modules, which evaluate surfaces on the host GPU.
pub trait TessModule: Send {
    /// Prepares for receiving `count` control points and returns the buffer layout it expects.
    fn prepare(&mut self, count: usize, has_color: bool, has_tex_coords: bool) -> Strides;

    /// Receives the control points of the draw that is about to be submitted.
    fn send(&mut self, data: ControlData<'_>);
}

/// An implementation of [`TessModule`] that discards control points.
#[derive(Debug, Clone, Copy)]
pub struct NopTessModule;

impl TessModule for NopTessModule {
    fn prepare(&mut self, _: usize, _: bool, _: bool) -> Strides {
        Strides::default()
    }

    fn send(&mut self, _: ControlData<'_>) {}
}
