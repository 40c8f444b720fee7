//! Starts the game client through its platform launch URI.

use std::process::Command;

use crate::error::{Error, Result};

/// Steam launch URI for Baldur's Gate 3.
pub const GAME_LAUNCH_URI: &str = "steam://rungameid/1086940";

/// Hand the launch URI to the OS. Returns once the handler exits; the game
/// itself keeps running detached.
pub fn launch_game() -> Result<()> {
    let status = launch_command()
        .status()
        .map_err(|err| Error::Launch(err.to_string()))?;
    if !status.success() {
        return Err(Error::Launch(format!("launcher exited with {status}")));
    }
    Ok(())
}

#[cfg(windows)]
fn launch_command() -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", GAME_LAUNCH_URI]);
    cmd
}

#[cfg(target_os = "macos")]
fn launch_command() -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(GAME_LAUNCH_URI);
    cmd
}

#[cfg(all(unix, not(target_os = "macos")))]
fn launch_command() -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(GAME_LAUNCH_URI);
    cmd
}
