//! Snapcrop platform core contracts.
//!
//! Display data structures shared by the capture backends and the CLI
//! without coupling them to a concrete OS integration.

use serde::{Deserialize, Serialize};

/// Geometry of the surface a capture mirrors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DisplayMetrics {
    /// Window bounds in physical pixels.
    pub width: u32,
    pub height: u32,
    /// Origin of the window bounds in the virtual desktop.
    pub x: i32,
    pub y: i32,
    /// Pixel density (dots per inch).
    pub density_dpi: u32,
    /// Scale factor (for example 1.0, 1.25, 2.0).
    pub scale_factor: f64,
    /// Height of the system status bar / top panel in physical pixels.
    pub status_bar_inset: u32,
}

impl DisplayMetrics {
    /// Metrics for a plain surface at 96 DPI with no chrome.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: 0,
            density_dpi: 96,
            scale_factor: 1.0,
            status_bar_inset: 0,
        }
    }

    pub fn with_status_bar_inset(mut self, inset: u32) -> Self {
        self.status_bar_inset = inset;
        self
    }

    /// Logical resolution (physical / scale).
    pub fn logical_width(&self) -> u32 {
        (self.width as f64 / self.scale_factor) as u32
    }

    /// Logical resolution (physical / scale).
    pub fn logical_height(&self) -> u32 {
        (self.height as f64 / self.scale_factor) as u32
    }

    /// Whether the bounds describe an allocatable surface.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Display server / platform family used for capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayServer {
    Wayland,
    X11,
    #[default]
    Unknown,
}

impl DisplayServer {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayServer::Wayland => "wayland",
            DisplayServer::X11 => "x11",
            DisplayServer::Unknown => "unknown",
        }
    }
}
