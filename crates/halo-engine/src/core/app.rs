use crate::coords::Vec2;
use crate::time::FrameTime;

use super::host::Host;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once, after the window exists and before the first frame.
    ///
    /// An error stops the runtime and is returned from `Runtime::run`.
    fn on_start(&mut self, host: &Host) -> anyhow::Result<()>;

    /// Called once per presented frame, after the host's frame tasks ran.
    fn on_frame(&mut self, host: &Host, time: FrameTime) -> AppControl {
        let _ = (host, time);
        AppControl::Continue
    }

    /// Called when the viewport's logical size changes.
    fn on_resize(&mut self, host: &Host, viewport: Vec2) {
        let _ = (host, viewport);
    }

    /// Called once before the runtime exits.
    fn on_exit(&mut self) {}
}
