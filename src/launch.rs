//! Best-effort "open with the default application".
//!
//! Nothing here can fail the run: a missing opener, a headless session, or a
//! permission problem is logged at debug level and otherwise ignored.

use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// The platform opener invocation for `path`.
fn opener_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        // The empty argument is the window title `start` expects first.
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Ask the OS to open `path`; never fails, never waits for the player.
pub fn open_with_default_app(path: &Path) {
    let spawned = opener_command(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match spawned {
        Ok(_) => debug!("Opened {}", path.display()),
        Err(e) => debug!("Could not open {} (ignored): {}", path.display(), e),
    }
}
