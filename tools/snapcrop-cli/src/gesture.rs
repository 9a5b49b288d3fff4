//! Parsing for the scripted pointer input and view sizes given on the command line.

use snapcrop_crop_editor::PointerEvent;
use snapcrop_geometry::Point2D;

/// Parse `WxH` into a positive view size.
pub fn parse_view_size(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("bad width in {s:?}"))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("bad height in {s:?}"))?;
    if !(w > 0.0 && h > 0.0) {
        return Err(format!("view size must be positive, got {s:?}"));
    }
    Ok((w, h))
}

/// Parse a whitespace-separated pointer script.
///
/// Tokens are `press:X,Y`, `move:X,Y`, and `release`.
pub fn parse_gesture(script: &str) -> anyhow::Result<Vec<PointerEvent>> {
    script
        .split_whitespace()
        .map(|token| {
            if token.eq_ignore_ascii_case("release") {
                return Ok(PointerEvent::Release);
            }
            let (kind, coords) = token
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("Unknown gesture token: {token}"))?;
            let point = parse_point(coords)
                .ok_or_else(|| anyhow::anyhow!("Bad coordinates in gesture token: {token}"))?;
            match kind.to_ascii_lowercase().as_str() {
                "press" | "down" => Ok(PointerEvent::Press(point)),
                "move" => Ok(PointerEvent::Move(point)),
                _ => Err(anyhow::anyhow!("Unknown gesture token: {token}")),
            }
        })
        .collect()
}

fn parse_point(s: &str) -> Option<Point2D> {
    let (x, y) = s.split_once(',')?;
    let x = x.trim().parse().ok()?;
    let y = y.trim().parse().ok()?;
    Some(Point2D::new(x, y))
}
