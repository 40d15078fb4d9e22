//! Color model shared by the clear pass and overlay renderer.

pub mod color;

pub use color::Color;
