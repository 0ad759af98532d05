use rand::Rng;
use rusqlite::Result as SqlResult;

use super::settings_db::SettingsStore;

pub const USERNAME_KEY: &str = "chat_username";

/// Returns the stored display name, generating and persisting
/// `User<1..=1000>` the first time.
pub fn resolve_display_name(store: &SettingsStore) -> SqlResult<String> {
    if let Some(name) = store.get(USERNAME_KEY)? {
        if !name.trim().is_empty() {
            return Ok(name);
        }
    }

    let name = generate_display_name();
    store.put(USERNAME_KEY, &name)?;
    log::info!("Generated display name {name}");
    Ok(name)
}

/// Persists a user-chosen display name, replacing any generated one.
pub fn set_display_name(store: &SettingsStore, name: &str) -> SqlResult<String> {
    let name = name.trim().to_string();
    store.put(USERNAME_KEY, &name)?;
    Ok(name)
}

fn generate_display_name() -> String {
    let suffix: u32 = rand::rng().random_range(1..=1000);
    format!("User{suffix}")
}
