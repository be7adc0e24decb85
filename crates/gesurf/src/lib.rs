//! Tessellation of the curved surfaces of the PSP GE.
//!
//! The GE can draw Bezier and B-spline surfaces directly from a grid of control points. This crate
//! turns such a draw into an indexed triangle, line or point mesh (or, when the host GPU can do it,
//! into a parametric grid plus control point buffers) and hands it to a [`DrawModule`].
//!
//! The entry point is [`DrawEngine`].
//!
//! [`DrawModule`]: modules::draw::DrawModule

pub mod basis;
pub mod config;
pub mod engine;
pub mod index;
pub mod knots;
pub mod modules;
pub mod patch;
pub mod quad;
pub mod state;
pub mod tess;
pub mod vertex;

pub use color;
pub use engine::{DrawEngine, PatchData, SubmitError, Submitted};
pub use scratch;
