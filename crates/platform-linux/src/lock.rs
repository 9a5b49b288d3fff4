//! Session lock detection through systemd-logind.

/// Whether the current graphical session is locked.
///
/// Asks `loginctl` for `LockedHint`. Sessions without logind report
/// unlocked.
pub fn is_session_locked() -> bool {
    let session = std::env::var("XDG_SESSION_ID").unwrap_or_else(|_| "auto".to_string());
    let output = std::process::Command::new("loginctl")
        .args(["show-session", &session, "-p", "LockedHint"])
        .output();

    match output {
        Ok(out) if out.status.success() => {
            parse_locked_hint(&String::from_utf8_lossy(&out.stdout)).unwrap_or(false)
        }
        Ok(out) => {
            tracing::debug!(status = ?out.status, "loginctl could not report LockedHint");
            false
        }
        Err(e) => {
            tracing::debug!(error = %e, "loginctl unavailable; assuming unlocked");
            false
        }
    }
}

/// Parse `LockedHint=yes`.
fn parse_locked_hint(output: &str) -> Option<bool> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("LockedHint="))
        .map(|value| value == "yes")
}
