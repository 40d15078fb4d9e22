//! Kindle engine crate.
//!
//! Owns the platform + GPU runtime pieces the fire demo is built on: the
//! winit event loop, the wgpu device/surface, input translation and frame timing.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
