use log::info;
use serde::{ Deserialize, Serialize };
use std::error::Error;
use std::fs;
use std::path::Path;

/// Locally saved user settings. Today this is just the generative-endpoint
/// credential; the file is read in full on startup and rewritten in full on
/// every save.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub api_key: Option<String>,
}

impl Profile {
    /// Load the profile from `path`. A missing file is the normal first-run
    /// state and yields the default profile.
    pub fn load(path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        let content = fs
            ::read_to_string(path)
            .map_err(|e| format!("Failed to read profile file '{}': {}", path, e))?;
        let profile: Profile = serde_json
            ::from_str(&content)
            .map_err(|e| format!("Failed to parse profile file '{}': {}", path, e))?;
        Ok(profile)
    }

    /// Persist the profile to `path`, overwriting whatever was there.
    pub fn save(&self, path: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e|
                    format!("Failed to create profile directory '{}': {}", parent.display(), e)
                )?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs
            ::write(path, json)
            .map_err(|e| format!("Failed to write profile file '{}': {}", path, e))?;
        info!("Profile saved to {}", path);
        Ok(())
    }

    /// Replace the stored credential. No format validation is applied; the
    /// endpoint is the only judge of a key's validity.
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> String {
        std::env
            ::temp_dir()
            .join(format!("reverse-tutor-profile-{}.json", Uuid::new_v4()))
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn test_missing_profile_loads_default() {
        let profile = Profile::load(&temp_path()).unwrap();
        assert!(profile.api_key.is_none());
    }

    #[test]
    fn test_save_then_load_round_trips_key() {
        let path = temp_path();
        let mut profile = Profile::default();
        profile.set_api_key("test-key-123");
        profile.save(&path).unwrap();

        let restored = Profile::load(&path).unwrap();
        assert_eq!(restored.api_key.as_deref(), Some("test-key-123"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_blank_key_clears_credential() {
        let mut profile = Profile::default();
        profile.set_api_key("abc");
        profile.set_api_key("   ");
        assert!(profile.api_key.is_none());
    }
}
