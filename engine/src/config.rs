//! Settings file loading.
//!
//! The settings file is a flat `Key=Value` list, one pair per line.
//! Values are taken verbatim after the first `=`: backslashes are literal
//! characters (Windows paths like `D:\photo\root` survive unmodified),
//! never escape sequences or line continuations. Lines starting with `#`
//! and blank lines are ignored, as are keys this tool does not know.
//!
//! The file is read once per run; the resulting `Configuration` is
//! immutable. Keys are optional at parse time - each workflow demands the
//! keys it actually needs.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ArchiveError;
use crate::model::{Configuration, MountSettings};

/// File name looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "setting.ini";

/// Default settings location: `setting.ini` beside the executable, falling
/// back to the current directory when the executable path is unavailable.
pub fn default_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Read and parse the settings file at `path`.
///
/// # Errors
/// `ConfigRead` when the file cannot be read, `ConfigValue` when a numeric
/// key does not parse, `ConfigKey` when `MountTarget` is given without
/// the matching user and password keys.
pub fn load(path: &Path) -> Result<Configuration, ArchiveError> {
    let text = fs::read_to_string(path).map_err(|e| ArchiveError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&text)
}

/// Parse settings from text. Separated from `load` for testability.
pub fn parse(text: &str) -> Result<Configuration, ArchiveError> {
    let mut config = Configuration::default();
    let mut mount_target = None;
    let mut mount_user = None;
    let mut mount_password = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "RootDirectory" => config.root_dir = Some(PathBuf::from(value)),
            "BackupDirectory" => config.backup_dir = Some(PathBuf::from(value)),
            "EvacuationDirectory" => config.evacuation_dir = Some(PathBuf::from(value)),
            "LogDirectory" => config.log_dir = Some(PathBuf::from(value)),
            "ArchiveMonth" => {
                let months = value.parse::<u32>().map_err(|_| ArchiveError::ConfigValue {
                    key: "ArchiveMonth",
                    value: value.to_string(),
                })?;
                config.archive_months = Some(months);
            }
            "EvacuationYear" => {
                let year = value.parse::<i32>().map_err(|_| ArchiveError::ConfigValue {
                    key: "EvacuationYear",
                    value: value.to_string(),
                })?;
                config.evacuation_year = Some(year);
            }
            "MountTarget" => mount_target = Some(value.to_string()),
            "MountUser" => mount_user = Some(value.to_string()),
            "MountPassword" => mount_password = Some(value.to_string()),
            _ => {}
        }
    }

    if let Some(target) = mount_target {
        let user = mount_user.ok_or(ArchiveError::ConfigKey { key: "MountUser" })?;
        let password = mount_password.ok_or(ArchiveError::ConfigKey { key: "MountPassword" })?;
        config.mount = Some(MountSettings {
            target,
            user,
            password,
        });
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let config = parse(
            "RootDirectory=D:\\photo\\root\n\
             BackupDirectory=E:\\photo\\backup\n\
             EvacuationDirectory=F:\\photo\\old\n\
             LogDirectory=D:\\photo\\log\n\
             ArchiveMonth=6\n\
             EvacuationYear=2010\n",
        )
        .expect("parse failed");

        // Backslashes come through untouched.
        assert_eq!(config.root_dir, Some(PathBuf::from("D:\\photo\\root")));
        assert_eq!(config.backup_dir, Some(PathBuf::from("E:\\photo\\backup")));
        assert_eq!(config.evacuation_dir, Some(PathBuf::from("F:\\photo\\old")));
        assert_eq!(config.log_dir, Some(PathBuf::from("D:\\photo\\log")));
        assert_eq!(config.archive_months, Some(6));
        assert_eq!(config.evacuation_year, Some(2010));
        assert!(config.mount.is_none());
    }

    #[test]
    fn test_parse_skips_comments_blanks_and_unknown_keys() {
        let config = parse(
            "# photo archive settings\n\
             \n\
             ArchiveMonth=12\n\
             SomeFutureKey=whatever\n\
             not a key value line\n",
        )
        .expect("parse failed");
        assert_eq!(config.archive_months, Some(12));
        assert!(config.root_dir.is_none());
    }

    #[test]
    fn test_parse_value_may_contain_equals() {
        let config = parse("RootDirectory=/mnt/photo=main\n").expect("parse failed");
        assert_eq!(config.root_dir, Some(PathBuf::from("/mnt/photo=main")));
    }

    #[test]
    fn test_parse_rejects_non_numeric_threshold() {
        let result = parse("ArchiveMonth=six\n");
        assert!(matches!(
            result,
            Err(ArchiveError::ConfigValue { key: "ArchiveMonth", .. })
        ));
    }

    #[test]
    fn test_parse_mount_settings_require_all_three_keys() {
        let result = parse("MountTarget=\\\\nas\\photo\n");
        assert!(matches!(result, Err(ArchiveError::ConfigKey { key: "MountUser" })));

        let config = parse(
            "MountTarget=\\\\nas\\photo\nMountUser=operator\nMountPassword=secret\n",
        )
        .expect("parse failed");
        let mount = config.mount.expect("mount settings missing");
        assert_eq!(mount.target, "\\\\nas\\photo");
        assert_eq!(mount.user, "operator");
        assert_eq!(mount.password, "secret");
    }

    #[test]
    fn test_load_missing_file_is_config_read_error() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let result = load(&temp.path().join("setting.ini"));
        assert!(matches!(result, Err(ArchiveError::ConfigRead { .. })));
    }
}
