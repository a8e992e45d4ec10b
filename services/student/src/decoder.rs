//! QR symbol detection on captured frames

use tracing::debug;

use crate::camera::Frame;

pub trait SymbolDecoder: Send + Sync {
    /// Text of the first readable symbol in `frame`
    fn decode(&self, frame: &Frame) -> Option<String>;
}

/// QR decoder over the luma channel of a frame
///
/// Dark-on-light symbols only; inverted codes are not attempted.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDecoder;

impl SymbolDecoder for QrDecoder {
    fn decode(&self, frame: &Frame) -> Option<String> {
        if frame.width() == 0 || frame.height() == 0 {
            return None;
        }

        let mut image = rqrr::PreparedImage::prepare_from_greyscale(
            frame.width(),
            frame.height(),
            |x, y| frame.luma_at(x, y),
        );

        for grid in image.detect_grids() {
            match grid.decode() {
                Ok((_, content)) => return Some(content),
                Err(e) => debug!("Unreadable QR grid: {:?}", e),
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faculty::render::ModuleMatrix;

    fn frame_of(text: &str, scale: usize) -> Frame {
        let (side, luma) = ModuleMatrix::encode(text).unwrap().rasterize(scale);
        Frame::from_luma(side, side, &luma).unwrap()
    }

    #[test]
    fn test_decodes_rendered_symbol() {
        let text = r#"{"sessionId":"session_c1_1714554000000_2024-05-01","courseCode":"CS301","classId":"A1"}"#;

        assert_eq!(QrDecoder.decode(&frame_of(text, 4)).as_deref(), Some(text));
    }

    #[test]
    fn test_blank_frame_has_no_symbol() {
        let frame = Frame::from_luma(64, 48, &vec![255; 64 * 48]).unwrap();
        assert_eq!(QrDecoder.decode(&frame), None);
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::from_rgba(0, 0, Vec::new()).unwrap();
        assert_eq!(QrDecoder.decode(&frame), None);
    }
}
