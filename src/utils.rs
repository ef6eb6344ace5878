//! Directory management following the XDG Base Directory layout
//!
//! - Data: `~/.local/share/storefront/` - configuration and the local store
//! - State: `~/.local/state/storefront/` - log file
//!
//! # Example
//!
//! ```no_run
//! use storefront::utils::{ensure_dirs, store_path};
//!
//! ensure_dirs().expect("Failed to create directories");
//! if let Some(path) = store_path() {
//!     println!("local store at {}", path.display());
//! }
//! ```

use directories::ProjectDirs;
use std::path::PathBuf;

const STORE_FILE: &str = "store.json";
const LOG_FILE: &str = "storefront.log";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "storefront", "storefront")
}

pub fn get_data_dir() -> Option<PathBuf> {
    project_dirs().map(|pd| pd.data_dir().to_path_buf())
}

pub fn get_state_dir() -> Option<PathBuf> {
    project_dirs().and_then(|pd| pd.state_dir().map(std::path::Path::to_path_buf))
}

/// File backing the local key/value store
pub fn store_path() -> Option<PathBuf> {
    get_data_dir().map(|dir| dir.join(STORE_FILE))
}

pub fn log_path() -> Option<PathBuf> {
    get_state_dir().map(|dir| dir.join(LOG_FILE))
}

pub fn ensure_dirs() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::fs::DirBuilder;
        use std::os::unix::fs::DirBuilderExt;

        let mut builder = DirBuilder::new();
        builder.mode(0o700);
        builder.recursive(true);

        if let Some(dir) = get_data_dir() {
            builder.create(dir)?;
        }
        if let Some(dir) = get_state_dir() {
            builder.create(dir)?;
        }
    }

    #[cfg(not(unix))]
    {
        if let Some(dir) = get_data_dir() {
            std::fs::create_dir_all(dir)?;
        }
        if let Some(dir) = get_state_dir() {
            std::fs::create_dir_all(dir)?;
        }
    }

    Ok(())
}
