use image::RgbaImage;
use image::imageops;
use starlay_types::{HashKey, Rect};

/// Content fingerprint of an image region.
///
/// Implementations must be deterministic and tolerate negligible pixel
/// noise, so repeated captures of the same on-screen text give the same key.
pub trait HashExtractor {
    fn extract(&self, image: &RgbaImage) -> HashKey;
}

impl<F> HashExtractor for F
where
    F: Fn(&RgbaImage) -> HashKey,
{
    fn extract(&self, image: &RgbaImage) -> HashKey {
        self(image)
    }
}

/// Copy `rect` out of `screenshot`.
///
/// Returns `None` for zero-area rects and rects reaching outside the image.
pub fn crop(screenshot: &RgbaImage, rect: &Rect) -> Option<RgbaImage> {
    if rect.is_empty() || rect.x < 0 || rect.y < 0 {
        return None;
    }
    if rect.right() > screenshot.width() as i64 || rect.bottom() > screenshot.height() as i64 {
        return None;
    }

    Some(imageops::crop_imm(screenshot, rect.x as u32, rect.y as u32, rect.width, rect.height).to_image())
}

/// Fingerprint the part of `screenshot` under `rect`, `None` when the crop is degenerate
pub fn sample(hasher: &dyn HashExtractor, screenshot: &RgbaImage, rect: &Rect) -> Option<HashKey> {
    crop(screenshot, rect).map(|cropped| hasher.extract(&cropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_crop_inside_bounds() {
        let mut screen = RgbaImage::new(10, 10);
        screen.put_pixel(2, 3, Rgba([9, 8, 7, 6]));

        let cropped = crop(&screen, &Rect::new(2, 3, 4, 4)).unwrap();
        assert_eq!(cropped.dimensions(), (4, 4));
        assert_eq!(cropped.get_pixel(0, 0), &Rgba([9, 8, 7, 6]));
    }

    #[test]
    fn test_degenerate_crops() {
        let screen = RgbaImage::new(10, 10);
        assert!(crop(&screen, &Rect::new(0, 0, 0, 5)).is_none());
        assert!(crop(&screen, &Rect::new(8, 8, 4, 4)).is_none());
        assert!(crop(&screen, &Rect::new(-1, 0, 4, 4)).is_none());
        assert!(crop(&screen, &Rect::new(0, 0, 10, 10)).is_some());
    }
}
