//! Filesystem layout shared by every component.
//!
//! The on-disk convention mirrors what the game expects: the live mods
//! folder sits next to `PlayerProfiles/Public/`, which holds the mod-list
//! descriptor, and each profile keeps a `Mods/` snapshot plus its own copy
//! of that descriptor.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::store::Settings;

/// Backing file holding the settings and the profile collection.
pub const STORE_FILE_NAME: &str = "Profile.ini";

/// Subdirectory of a profile that holds the mirrored mod files.
pub const MODS_DIR_NAME: &str = "Mods";

/// The game's mod-list descriptor file.
pub const DESCRIPTOR_FILE_NAME: &str = "modsettings.lsx";

/// Where the game keeps the descriptor, relative to the live folder's parent.
const DESCRIPTOR_OFFSET: [&str; 2] = ["PlayerProfiles", "Public"];

/// Paths derived from the configured [`Settings`].
#[derive(Debug, Clone)]
pub struct GamePaths {
    /// The directory the game reads its active mods from.
    pub live_mods_dir: PathBuf,
    /// The directory profile subdirectories are created under.
    pub storage_dir: PathBuf,
    /// The descriptor the game reads, next to the live mods folder.
    pub live_descriptor: PathBuf,
}

impl GamePaths {
    pub fn from_settings(settings: &Settings) -> Self {
        let live_mods_dir = settings.live_mods_dir.clone();
        let base = live_mods_dir.parent().unwrap_or(Path::new("")).to_path_buf();
        let live_descriptor = DESCRIPTOR_OFFSET
            .iter()
            .fold(base, |path, segment| path.join(segment))
            .join(DESCRIPTOR_FILE_NAME);

        Self {
            live_mods_dir,
            storage_dir: settings.storage_dir.clone(),
            live_descriptor,
        }
    }

    /// Storage directory a profile with this name lives under.
    pub fn profile_dir(&self, name: &str) -> PathBuf {
        self.storage_dir.join(name)
    }

    /// Live mods location of a standard install, offered by the setup wizard.
    pub fn default_live_mods() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| {
            dirs.data_local_dir()
                .join("Larian Studios")
                .join("Baldur's Gate 3")
                .join(MODS_DIR_NAME)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(live: &str, storage: &str) -> Settings {
        Settings {
            live_mods_dir: PathBuf::from(live),
            storage_dir: PathBuf::from(storage),
        }
    }

    #[test]
    fn descriptor_offset_is_relative_to_the_live_parent() {
        let paths = GamePaths::from_settings(&settings("/larian/Baldur's Gate 3/Mods", "/store"));
        assert_eq!(
            paths.live_descriptor,
            PathBuf::from("/larian/Baldur's Gate 3/PlayerProfiles/Public/modsettings.lsx")
        );
    }

    #[test]
    fn profile_dir_joins_the_storage_root() {
        let paths = GamePaths::from_settings(&settings("/game/Mods", "/store"));
        assert_eq!(paths.profile_dir("Tactician"), PathBuf::from("/store/Tactician"));
    }
}
