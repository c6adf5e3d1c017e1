use image::RgbaImage;

/// Source of full-screen snapshots
pub trait ScreenSource {
    fn grab(&mut self) -> anyhow::Result<RgbaImage>;
}

impl<T: ScreenSource + ?Sized> ScreenSource for Box<T> {
    fn grab(&mut self) -> anyhow::Result<RgbaImage> {
        (**self).grab()
    }
}
