//! Output surfaces for finished frames.
//!
//! A [`Panel`] receives exactly one frame per successful wake cycle. Panels
//! are infallible from the workflow's side; anything that goes wrong while
//! pushing pixels is logged by the panel itself.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::frame::Frame;
use crate::renderer::ascii_art;

pub trait Panel {
    fn show(&mut self, frame: &Frame);
}

impl<T: Panel + ?Sized> Panel for Box<T> {
    fn show(&mut self, frame: &Frame) {
        (**self).show(frame);
    }
}

/// Development panel: prints the frame as ASCII art on stdout.
#[derive(Debug, Default)]
pub struct AsciiPanel;

impl Panel for AsciiPanel {
    fn show(&mut self, frame: &Frame) {
        print!("{}", ascii_art(frame));
        std::io::stdout().flush().ok();
    }
}

/// Writes each frame to a binary PBM (P4) file, overwriting the previous one.
#[derive(Debug)]
pub struct PbmPanel {
    path: PathBuf,
}

impl PbmPanel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Encode a frame as P4. PBM uses 1 = black, matching the frame's ink bit.
pub fn encode_pbm(frame: &Frame) -> Vec<u8> {
    let mut out = format!("P4\n{} {}\n", frame.width(), frame.height()).into_bytes();
    out.extend_from_slice(frame.bits());
    out
}

impl Panel for PbmPanel {
    fn show(&mut self, frame: &Frame) {
        match fs::write(&self.path, encode_pbm(frame)) {
            Ok(()) => log::info!("Frame written to {}", self.path.display()),
            Err(e) => log::warn!("Could not write {}: {e}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;

    #[test]
    fn test_pbm_header_and_body() {
        let mut frame = Frame::new(10, 2);
        frame.set_pixel(0, 0, BinaryColor::On);
        let pbm = encode_pbm(&frame);
        assert!(pbm.starts_with(b"P4\n10 2\n"));
        let body = &pbm[b"P4\n10 2\n".len()..];
        assert_eq!(body, &[0x80, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_pbm_panel_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.pbm");
        let mut panel = PbmPanel::new(&path);
        panel.show(&Frame::default());
        let written = fs::read(&path).unwrap();
        assert_eq!(written.len(), "P4\n296 128\n".len() + 37 * 128);
    }
}
