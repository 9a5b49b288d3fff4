//! Display detection, window bounds, and top-chrome inset.

use snapcrop_common::error::{SnapError, SnapResult};
pub use snapcrop_platform_core::{DisplayMetrics, DisplayServer};

/// Detect the current display server.
pub fn detect_display_server() -> DisplayServer {
    if std::env::var("WAYLAND_DISPLAY").is_ok() {
        DisplayServer::Wayland
    } else if std::env::var("DISPLAY").is_ok() {
        DisplayServer::X11
    } else {
        DisplayServer::Unknown
    }
}

/// Whether an X server (native or XWayland) is reachable.
pub fn has_x11_display() -> bool {
    std::env::var("DISPLAY").map(|d| !d.is_empty()).unwrap_or(false)
}

/// Query the root window bounds and density through `xdpyinfo`, and the
/// top inset through the EWMH work area.
pub fn detect_display_metrics() -> SnapResult<DisplayMetrics> {
    let output = std::process::Command::new("xdpyinfo")
        .output()
        .map_err(|e| SnapError::platform(format!("xdpyinfo unavailable: {e}")))?;
    if !output.status.success() {
        return Err(SnapError::platform("xdpyinfo could not open the display"));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);

    let (width, height) = parse_dimensions(&stdout)
        .ok_or_else(|| SnapError::platform("xdpyinfo reported no screen dimensions"))?;
    let density_dpi = parse_resolution(&stdout).unwrap_or(96);

    let metrics = DisplayMetrics {
        width,
        height,
        x: 0,
        y: 0,
        density_dpi,
        scale_factor: density_dpi as f64 / 96.0,
        status_bar_inset: detect_top_inset().unwrap_or(0),
    };
    tracing::debug!(?metrics, "Detected display metrics");
    Ok(metrics)
}

/// Height of panels docked at the top edge, from `_NET_WORKAREA`.
pub fn detect_top_inset() -> Option<u32> {
    let output = std::process::Command::new("xprop")
        .args(["-root", "_NET_WORKAREA"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_workarea_top(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `dimensions:    1920x1080 pixels (508x285 millimeters)`.
fn parse_dimensions(xdpyinfo: &str) -> Option<(u32, u32)> {
    let line = xdpyinfo
        .lines()
        .find(|l| l.trim_start().starts_with("dimensions:"))?;
    let value = line.split_whitespace().nth(1)?;
    let (w, h) = value.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

/// Parse `resolution:    96x96 dots per inch`.
fn parse_resolution(xdpyinfo: &str) -> Option<u32> {
    let line = xdpyinfo
        .lines()
        .find(|l| l.trim_start().starts_with("resolution:"))?;
    let value = line.split_whitespace().nth(1)?;
    value.split('x').next()?.parse().ok()
}

/// Parse `_NET_WORKAREA(CARDINAL) = 0, 27, 1920, 1053`.
fn parse_workarea_top(xprop: &str) -> Option<u32> {
    let (_, values) = xprop.split_once('=')?;
    values.split(',').nth(1)?.trim().parse().ok()
}
