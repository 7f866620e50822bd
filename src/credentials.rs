/// Resolution of the ambient application-default credential file.
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LakeError, Result};

pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
const ADC_FILE: &str = "application_default_credentials.json";

/// Well-known location of the credential file for this OS, if the base
/// directory (`%APPDATA%` or `$HOME`) is known.
pub fn default_location() -> Option<PathBuf> {
    if cfg!(windows) {
        env::var_os("APPDATA").map(|appdata| PathBuf::from(appdata).join("gcloud").join(ADC_FILE))
    } else {
        env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("gcloud")
                .join(ADC_FILE)
        })
    }
}

/// Find the credential file: explicit override first, then
/// `GOOGLE_APPLICATION_CREDENTIALS`, then the per-OS location.
pub fn resolve(explicit: Option<&Path>) -> Result<PathBuf> {
    let candidate = match explicit {
        Some(path) => path.to_path_buf(),
        None => match env::var_os(CREDENTIALS_ENV) {
            Some(path) => PathBuf::from(path),
            None => default_location().ok_or_else(|| {
                LakeError::Config("cannot locate home directory for credentials".into())
            })?,
        },
    };

    if !candidate.is_file() {
        return Err(LakeError::MissingCredentials { path: candidate });
    }
    debug!(path = %candidate.display(), "using credentials");
    Ok(candidate)
}
