pub mod database;
pub mod profile;
pub mod settings_db;

pub use profile::{resolve_display_name, set_display_name};
pub use settings_db::SettingsStore;

use std::fs;
use std::path::Path;

/// Ensure the directory holding the database file exists
pub fn ensure_data_dir(database_path: &str) -> std::io::Result<()> {
    if let Some(parent) = Path::new(database_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
