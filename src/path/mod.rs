//! Fixed closed travel curve and per-frame sampling along it.

mod curve;
mod sampler;

pub use curve::CatmullRomCurve;
pub use sampler::{wrap_unit, PathSample, PathSampler};
