//! GPU rendering support.
//!
//! Each renderer owns its GPU resources (pipelines, buffers) and creates them
//! lazily on first use against the current surface format.
//!
//! Overlay convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shader converts to NDC using a viewport uniform.

mod ctx;
pub mod overlay;

pub use ctx::{RenderCtx, RenderTarget};
