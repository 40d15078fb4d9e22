use winit::window::{CursorIcon, Window};

use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Window handle plus a few convenience queries.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the logical window size as `(width, height)` in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        let phys = self.window.inner_size();
        let scale = self.window.scale_factor();
        let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(scale);
        (logi.width as f32, logi.height as f32)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    /// Sets the mouse cursor shape for this window.
    pub fn set_cursor(&self, cursor: CursorIcon) {
        self.window.set_cursor(cursor);
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Current viewport in logical pixels.
    pub fn viewport(&self) -> Viewport {
        let (w, h) = self.window.logical_size();
        Viewport::new(w, h)
    }

    /// Clears the surface with `clear`, calls `draw` with a ready [`RenderCtx`] and
    /// [`RenderTarget`], then presents the frame.
    ///
    /// Surface errors are resolved through [`Gpu::handle_surface_error`]. A fatal
    /// one is reported through [`RuntimeCtx::fail`] and returns [`AppControl::Exit`].
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let viewport = self.viewport();
        let scale_factor = self.window.window.scale_factor() as f32;

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let reason = err.to_string();
                let action = self.gpu.handle_surface_error(err);
                log::debug!("surface error handled: {action:?}");
                return surface_error_control(action, &reason, self.runtime);
            }
        };

        // Clear pass; dropped before the encoder is moved into submit().
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kindle clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            viewport,
            scale_factor,
        );

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}

fn surface_error_control(action: SurfaceErrorAction, reason: &str, runtime: &mut RuntimeCtx) -> AppControl {
    match action {
        SurfaceErrorAction::Fatal => {
            runtime.fail(anyhow::anyhow!("fatal surface error: {reason}"));
            AppControl::Exit
        }
        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => AppControl::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_surface_error_fails_the_runtime() {
        let mut runtime = RuntimeCtx::default();
        let control = surface_error_control(SurfaceErrorAction::Fatal, "Out of memory", &mut runtime);
        assert_eq!(control, AppControl::Exit);
        let err = runtime.take_failure().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("fatal surface error: Out of memory"));
    }

    #[test]
    fn recoverable_surface_errors_continue() {
        let mut runtime = RuntimeCtx::default();
        for action in [SurfaceErrorAction::Reconfigured, SurfaceErrorAction::SkipFrame] {
            assert_eq!(surface_error_control(action, "lost", &mut runtime), AppControl::Continue);
        }
        assert!(runtime.take_failure().is_none());
    }
}
