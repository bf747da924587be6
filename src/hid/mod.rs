//! HID keyboard report type and the device-stack seam.

pub mod keyboard;

#[cfg(test)]
mod tests;

pub use keyboard::KeyboardReport;

/// The USB device stack as seen from the playback engine.
///
/// Readiness is cooperative: nothing makes progress on the bus unless
/// `poll()` is awaited, so every wait loop must call it.
#[allow(async_fn_in_trait)]
pub trait HidHost {
    /// Run the device stack's cooperative task function once.
    async fn poll(&mut self);

    /// `true` when the host can accept the next keyboard report.
    fn is_ready(&self) -> bool;

    /// `true` while the host has the bus suspended.
    fn is_suspended(&self) -> bool;

    /// Ask the host to resume the bus. Returns `false` if the request
    /// could not be issued (remote wakeup not enabled by the host).
    fn remote_wakeup(&mut self) -> bool;

    /// Queue one report. Returns `false` if the stack refused it.
    fn send_report(&mut self, report: &KeyboardReport) -> bool;
}
