//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Units (world units, radians, dB, etc.)
//! - Documented ranges and meanings
//! - Validation where a bad value would poison a frame

mod audio;
mod mapping;
mod path;
mod render;
mod scene;

// Re-export all types
pub use audio::{AnalyserConfig, PlaybackConfig};
pub use mapping::{BandConfig, BandNormalization, ParameterMapping};
pub use path::{CurveType, PathConfig, TUNNEL_CONTROL_POINTS};
pub use render::{LightConfig, RenderConfig};
pub use scene::{hex_to_rgb, KnotConfig, TunnelConfig};
