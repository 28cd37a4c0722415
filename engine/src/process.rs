//! Synchronous helper-process execution.
//!
//! Used to mount the network drive before a run. The child's standard
//! output is captured and recorded in the log; it is not parsed. The call
//! blocks until the child exits.

use std::process::Command;

use crate::error::ArchiveError;
use crate::model::MountSettings;

/// Run a program to completion and return its captured stdout.
///
/// Only a failure to launch is an error; a non-zero exit status is left
/// for the operator to spot in the logged output.
pub fn run_command(program: &str, args: &[String]) -> Result<String, ArchiveError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| ArchiveError::ProcessFailed {
            command: format!("{} {}", program, args.join(" ")),
            source: e,
        })?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Argument vector for `net use <target> <password> /user:<user>`.
fn net_use_args(settings: &MountSettings) -> Vec<String> {
    vec![
        "use".to_string(),
        settings.target.clone(),
        settings.password.clone(),
        format!("/user:{}", settings.user),
    ]
}

/// Mount the configured network share and return the command output.
pub fn mount_share(settings: &MountSettings) -> Result<String, ArchiveError> {
    run_command("net", &net_use_args(settings))
}
