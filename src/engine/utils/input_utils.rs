use glam::Vec2;

/// Standard normalised device coordinates: x right, y up, both in [-1, 1]
pub fn window_to_ndc(x: f64, y: f64, width: f64, height: f64) -> Vec2 {
    let width = width.max(1.0);
    let height = height.max(1.0);
    Vec2::new(((x / width) * 2.0 - 1.0) as f32, (1.0 - (y / height) * 2.0) as f32)
}

/// Cursor coordinates the sheep tracks with: both axes mirrored relative to
/// `window_to_ndc`, so the sheep faces the cursor from across the page.
pub fn window_to_mirrored_ndc(x: f64, y: f64, width: f64, height: f64) -> Vec2 {
    -window_to_ndc(x, y, width, height)
}
