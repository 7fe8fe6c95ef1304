//! Swapping the running binary for a downloaded one.
//!
//! The running executable is renamed aside (allowed even while it runs on
//! Windows), the new file copied into its place, and the old one removed on
//! the next start.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use shell_logging::{shell_info, shell_warn, UPDATE_TARGET};
use thiserror::Error;

/// Passed to the relaunched binary so it can tell it was just updated.
pub const UPDATED_FLAG: &str = "--updated";

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("cannot determine current executable: {0}")]
    CurrentExe(std::io::Error),
    #[error("downloaded artifact {0:?} is missing")]
    MissingArtifact(PathBuf),
    #[error("cannot move {from:?} aside to {to:?}: {source}")]
    Backup {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot install new binary to {target:?}: {source}")]
    Copy {
        target: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot relaunch {0:?}: {1}")]
    Relaunch(PathBuf, std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Installer {
    target: PathBuf,
}

impl Installer {
    pub fn for_current_exe() -> Result<Self, InstallError> {
        let target = std::env::current_exe().map_err(InstallError::CurrentExe)?;
        Ok(Self::new(target))
    }

    pub fn new(target: PathBuf) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self
            .target
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".old");
        self.target.with_file_name(name)
    }

    /// Puts `artifact` in place of the target; the previous binary stays at
    /// `<name>.old` until [`Installer::cleanup_previous`].
    pub fn replace(&self, artifact: &Path) -> Result<(), InstallError> {
        if !artifact.is_file() {
            return Err(InstallError::MissingArtifact(artifact.to_path_buf()));
        }
        let backup = self.backup_path();
        let _ = fs::remove_file(&backup);

        if self.target.exists() {
            fs::rename(&self.target, &backup).map_err(|source| InstallError::Backup {
                from: self.target.clone(),
                to: backup.clone(),
                source,
            })?;
        }

        if let Err(source) = fs::copy(artifact, &self.target) {
            if backup.exists() {
                let _ = fs::rename(&backup, &self.target);
            }
            return Err(InstallError::Copy {
                target: self.target.clone(),
                source,
            });
        }
        set_executable(&self.target);
        let _ = fs::remove_file(artifact);

        shell_info!(target: UPDATE_TARGET, "installed new binary at {:?}", self.target);
        Ok(())
    }

    /// Replace and start the new binary; the caller is expected to exit.
    pub fn replace_and_relaunch(&self, artifact: &Path) -> Result<(), InstallError> {
        self.replace(artifact)?;
        Command::new(&self.target)
            .arg(UPDATED_FLAG)
            .spawn()
            .map_err(|err| InstallError::Relaunch(self.target.clone(), err))?;
        Ok(())
    }

    /// Removes the binary left behind by a previous update.
    pub fn cleanup_previous(&self) {
        let backup = self.backup_path();
        if backup.exists() {
            if let Err(err) = fs::remove_file(&backup) {
                shell_warn!(target: UPDATE_TARGET, "could not remove {:?}: {}", backup, err);
            }
        }
    }
}

pub fn was_just_updated<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    args.into_iter().any(|arg| arg.as_ref() == UPDATED_FLAG)
}

fn set_executable(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(err) = fs::set_permissions(path, fs::Permissions::from_mode(0o755)) {
            shell_warn!(target: UPDATE_TARGET, "cannot mark {:?} executable: {}", path, err);
        }
    }
    let _ = path;
}
