//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (platform loop) and the
//! application driving it, plus the per-frame context handed to that application.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
