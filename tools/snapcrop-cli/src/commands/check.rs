//! Check system capabilities.

use snapcrop_platform_linux::{detect_display_server, DisplayServer};

pub fn run() -> anyhow::Result<()> {
    println!("Snapcrop System Check");
    println!("{}", "=".repeat(50));

    // Display server
    let ds = detect_display_server();
    match ds {
        DisplayServer::X11 => println!("[OK] Display server: X11"),
        DisplayServer::Wayland => {
            println!("[WARN] Display server: Wayland (capture needs XWayland)")
        }
        _ => println!("[WARN] Display server: Unknown"),
    }

    // Window bounds
    match snapcrop_platform_linux::detect_display_metrics() {
        Ok(m) => println!(
            "[OK] Display: {}x{} @ {} dpi (scale: {}x, top inset: {}px)",
            m.width, m.height, m.density_dpi, m.scale_factor, m.status_bar_inset
        ),
        Err(e) => println!("[WARN] Display metrics unavailable: {e}"),
    }

    // Lock state
    let locked = snapcrop_platform_linux::is_session_locked();
    println!(
        "[OK] Session lock state: {}",
        if locked { "locked" } else { "unlocked" }
    );
    if snapcrop_capture_engine::is_capture_in_progress() {
        println!("[INFO] A capture is in progress in this process");
    }

    // Check permissions
    let capabilities = snapcrop_platform_linux::permissions::check_capabilities();
    println!();
    snapcrop_platform_linux::permissions::print_capability_report(&capabilities);

    let all_required_ok = capabilities
        .iter()
        .filter(|c| c.required)
        .all(|c| c.available);

    println!();
    if all_required_ok {
        println!("All required capabilities are available. Snapcrop is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}
