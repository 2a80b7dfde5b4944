/// Largest size with the aspect ratio of `width` x `height` that fits in `bounds`.
///
/// Scales up as well as down, so small codes fill the preview area.
pub fn fit_within(width: u32, height: u32, bounds: (f32, f32)) -> (f32, f32) {
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }

    let (w, h) = (width as f32, height as f32);
    let scale = (bounds.0 / w).min(bounds.1 / h);
    (w * scale, h * scale)
}
