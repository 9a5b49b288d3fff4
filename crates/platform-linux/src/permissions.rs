//! Capability detection and guidance for Linux.
//!
//! Snapcrop shells out to a handful of desktop tools depending on the
//! capture backend in use.

use crate::display::{detect_display_server, has_x11_display, DisplayServer};

/// A system capability that Snapcrop may need.
#[derive(Debug, Clone)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

/// Check all capabilities and report status.
pub fn check_capabilities() -> Vec<Capability> {
    vec![
        check_x11_display(),
        check_tool(
            "xdpyinfo",
            "Window bounds and pixel density detection",
            true,
            "Install x11-utils: sudo apt install x11-utils",
        ),
        check_tool(
            "xprop",
            "Top panel inset detection (status bar trim)",
            false,
            "Install x11-utils: sudo apt install x11-utils",
        ),
        check_tool(
            "loginctl",
            "Session lock detection for the disable-on-lock guard",
            false,
            "Run under systemd-logind to enable lock detection",
        ),
        check_tool(
            "gst-inspect-1.0",
            "GStreamer frame grab (ximagesrc)",
            false,
            "Install GStreamer: sudo apt install gstreamer1.0-tools gstreamer1.0-plugins-good",
        ),
    ]
}

fn check_x11_display() -> Capability {
    let available = has_x11_display();
    let wayland_only = detect_display_server() == DisplayServer::Wayland && !available;

    Capability {
        name: "X11 Display".to_string(),
        description: "X server or XWayland to mirror the screen from".to_string(),
        available,
        required: true,
        fix_instructions: if wayland_only {
            Some("Enable XWayland or run inside an X11 session".to_string())
        } else if !available {
            Some("Run from a graphical desktop session (DISPLAY is unset)".to_string())
        } else {
            None
        },
    }
}

fn check_tool(binary: &str, description: &str, required: bool, fix: &str) -> Capability {
    let available = binary_on_path(binary);
    Capability {
        name: binary.to_string(),
        description: description.to_string(),
        available,
        required,
        fix_instructions: (!available).then(|| fix.to_string()),
    }
}

fn binary_on_path(binary: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(binary).is_file()))
        .unwrap_or(false)
}

/// Print a user-friendly capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("Snapcrop System Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        let status = if cap.available {
            "[OK]"
        } else if cap.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };

        println!("  {} {}: {}", status, cap.name, cap.description);

        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}
