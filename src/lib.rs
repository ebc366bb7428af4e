//! tunnelviz library - audio-reactive tunnel flight

pub mod audio;
pub mod camera;
pub mod cli;
pub mod driver;
pub mod error;
pub mod mapping;
pub mod params;
pub mod path;
pub mod rendering;
pub mod scene;
