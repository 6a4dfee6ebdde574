use std::io::ErrorKind::WouldBlock;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use scrap::{Capturer, Display};

use crate::error::CaptureError;

/// One captured frame: tightly packed RGBA pixels for a single instant.
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// A source of display frames. The streaming layer only sees this trait,
/// so alternate capture backends can be substituted without touching the
/// protocol code.
pub trait Capture: Send {
    fn capture(&mut self) -> Result<CapturedFrame, CaptureError>;
}

/// Builds a fresh capture backend for one viewer session.
pub type CaptureFactory =
    Arc<dyn Fn() -> Result<Box<dyn Capture>, CaptureError> + Send + Sync>;

/// Screen capture backed by the OS capture API for the primary display.
pub struct ScreenCapture {
    capturer: Capturer,
    width: usize,
    height: usize,
}

impl ScreenCapture {
    pub fn new() -> Result<Self, CaptureError> {
        let display =
            Display::primary().map_err(|e| CaptureError::NoDisplay(e.to_string()))?;
        let width = display.width();
        let height = display.height();
        let capturer =
            Capturer::new(display).map_err(|e| CaptureError::NoDisplay(e.to_string()))?;

        Ok(ScreenCapture {
            capturer,
            width,
            height,
        })
    }

    /// Factory handed to the server state; each viewer session gets its
    /// own capturer.
    pub fn factory() -> CaptureFactory {
        Arc::new(|| ScreenCapture::new().map(|c| Box::new(c) as Box<dyn Capture>))
    }
}

// SAFETY: `ScreenCapture` is only ever accessed through the single owning
// task per viewer session; `scrap::Capturer`'s platform handle is not
// `Send` by default but is not shared or accessed concurrently here.
unsafe impl Send for ScreenCapture {}

impl Capture for ScreenCapture {
    fn capture(&mut self) -> Result<CapturedFrame, CaptureError> {
        // Capture frame, waiting out transient WouldBlock results
        let buffer = loop {
            match self.capturer.frame() {
                Ok(buffer) => break buffer,
                Err(error) if error.kind() == WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(error) => return Err(CaptureError::Frame(error)),
            }
        };

        if self.height == 0 || buffer.len() < self.width * self.height * 4 {
            return Err(CaptureError::ShortBuffer);
        }

        // Rows come out BGRA and padded to the stride
        let stride = buffer.len() / self.height;
        let mut pixels = Vec::with_capacity(self.width * self.height * 4);
        for row in buffer.chunks_exact(stride).take(self.height) {
            for bgra in row[..self.width * 4].chunks_exact(4) {
                pixels.extend_from_slice(&[bgra[2], bgra[1], bgra[0], 255]);
            }
        }

        Ok(CapturedFrame {
            width: self.width as u32,
            height: self.height as u32,
            pixels,
        })
    }
}
