//! Create, refresh, activate and delete operations over profiles.
//!
//! This is the orchestration layer between the registry (records) and the
//! mirror engine (directory contents). Operations validate up front, touch
//! the filesystem, then persist the record change, so a failed step never
//! leaves the store pointing at state it does not describe.

use std::fs;

use crate::error::{Error, Result};
use crate::launch;
use crate::mirror;
use crate::paths::GamePaths;
use crate::registry::ProfileRegistry;
use crate::store::{Profile, Settings};

/// Upper bound on user-chosen profile names.
pub const NAME_MAX_LEN: usize = 25;

/// Reserved by the legacy store format as its "no selection" marker.
pub const RESERVED_NAME: &str = "-1";

pub fn validate_profile_name(name: &str) -> Result<()> {
    let length = name.chars().count();
    if length == 0 || length > NAME_MAX_LEN {
        return Err(Error::InvalidName(format!(
            "must be between 1 and {NAME_MAX_LEN} characters"
        )));
    }
    if name.chars().all(char::is_whitespace) {
        return Err(Error::InvalidName(
            "cannot be empty or only whitespace".to_string(),
        ));
    }
    if name == RESERVED_NAME {
        return Err(Error::InvalidName(format!("'{RESERVED_NAME}' is reserved")));
    }
    // The name doubles as a directory name under the storage root.
    if name == "." || name == ".." || name.chars().any(|c| matches!(c, '/' | '\\' | '\0')) {
        return Err(Error::InvalidName(format!(
            "'{name}' is not usable as a folder name"
        )));
    }
    Ok(())
}

/// Derive [`GamePaths`], refusing to run path operations on blank settings.
pub fn game_paths(registry: &ProfileRegistry) -> Result<GamePaths> {
    if !registry.settings().is_configured() {
        return Err(Error::SettingsUnset);
    }
    Ok(GamePaths::from_settings(registry.settings()))
}

/// Create a profile with an empty `Mods/` snapshot.
pub fn create_empty(registry: &mut ProfileRegistry, name: &str) -> Result<Profile> {
    validate_profile_name(name)?;
    let paths = game_paths(registry)?;

    let profile = Profile {
        name: name.to_string(),
        storage_path: paths.profile_dir(name),
    };
    // Equal names map to the same directory, so creating it before the
    // duplicate check cannot orphan anything if the add is rejected.
    fs::create_dir_all(profile.mods_dir())?;
    registry.add(profile.clone())?;
    Ok(profile)
}

/// Create a profile seeded from the current live mods folder.
///
/// If the live folder is absent the freshly created empty profile stays
/// behind, matching the legacy flow.
pub fn create_from_live(registry: &mut ProfileRegistry, name: &str) -> Result<(Profile, u64)> {
    let profile = create_empty(registry, name)?;
    let paths = game_paths(registry)?;
    if !paths.live_mods_dir.is_dir() {
        return Err(Error::LiveModsMissing(paths.live_mods_dir));
    }
    let copied = mirror::export_live_to_profile(&paths, &profile)?;
    Ok((profile, copied))
}

/// Overwrite a profile's stored snapshot from the current live mods folder.
pub fn refresh_from_live(registry: &ProfileRegistry, profile: &Profile) -> Result<u64> {
    let paths = game_paths(registry)?;
    mirror::export_live_to_profile(&paths, profile)
}

/// Swap a profile's snapshot into the live mods folder and start the game.
pub fn activate(registry: &ProfileRegistry, profile: &Profile) -> Result<u64> {
    activate_with(registry, profile, launch::launch_game)
}

/// [`activate`] with the game-launch step injected, for callers and tests
/// that must not spawn the real client.
pub fn activate_with<F>(registry: &ProfileRegistry, profile: &Profile, launcher: F) -> Result<u64>
where
    F: FnOnce() -> Result<()>,
{
    let paths = game_paths(registry)?;
    let copied = mirror::import_profile_to_live(&paths, profile)?;
    launcher()?;
    Ok(copied)
}

/// Delete a profile's storage tree and registry record.
///
/// The tree goes first; if its removal fails the record is kept and the
/// error surfaced, so the store never loses track of directories that are
/// still on disk. A tree already gone (deleted externally) skips straight
/// to deregistration.
pub fn delete(registry: &mut ProfileRegistry, name: &str) -> Result<Profile> {
    let storage = registry
        .get(name)
        .ok_or_else(|| Error::NotFound(name.to_string()))?
        .storage_path
        .clone();

    if storage.exists() {
        fs::remove_dir_all(&storage)?;
    }
    registry.remove(name)
}

/// Replace the configured folders (the "setup" operation).
pub fn reconfigure(registry: &mut ProfileRegistry, settings: Settings) -> Result<()> {
    registry.replace_settings(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::test_utils::{file_set, setup_registry};
    use std::cell::Cell;
    use tempfile::TempDir;

    #[test]
    fn name_policy() {
        assert!(validate_profile_name("Tav").is_ok());
        assert!(validate_profile_name(&"a".repeat(25)).is_ok());
        assert!(validate_profile_name("with spaces").is_ok());

        assert!(validate_profile_name("").is_err());
        assert!(validate_profile_name(&"a".repeat(26)).is_err());
        assert!(validate_profile_name("   ").is_err());
        assert!(validate_profile_name("-1").is_err());
        assert!(validate_profile_name("a/b").is_err());
        assert!(validate_profile_name("..").is_err());
    }

    #[test]
    fn create_empty_builds_storage_and_record() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup_registry(&temp);

        let profile = create_empty(&mut registry, "Alpha").unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.all()[0].name, "Alpha");
        assert_eq!(
            profile.storage_path,
            registry.settings().storage_dir.join("Alpha")
        );
        assert!(profile.storage_path.is_dir());
        assert!(profile.mods_dir().is_dir());
    }

    #[test]
    fn create_empty_rejects_duplicates_and_leaves_the_registry_alone() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup_registry(&temp);
        create_empty(&mut registry, "Alpha").unwrap();

        assert!(matches!(
            create_empty(&mut registry, "Alpha"),
            Err(Error::DuplicateName(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn create_from_live_snapshots_the_live_set() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup_registry(&temp);
        let live = registry.settings().live_mods_dir.clone();
        fs::create_dir_all(live.join("sub")).unwrap();
        fs::write(live.join("a.pak"), "a").unwrap();
        fs::write(live.join("sub/b.pak"), "b").unwrap();

        let (profile, copied) = create_from_live(&mut registry, "Honour").unwrap();

        assert_eq!(copied, 2);
        assert_eq!(file_set(&profile.mods_dir()), file_set(&live));
        assert!(profile.descriptor_file().is_file());
    }

    #[test]
    fn create_from_live_without_a_live_folder_keeps_the_empty_profile() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup_registry(&temp);
        let live = registry.settings().live_mods_dir.clone();
        fs::remove_dir_all(&live).unwrap();

        assert!(matches!(
            create_from_live(&mut registry, "Solo"),
            Err(Error::LiveModsMissing(_))
        ));
        assert!(registry.get("Solo").is_some());
    }

    #[test]
    fn refresh_overwrites_the_snapshot() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup_registry(&temp);
        let live = registry.settings().live_mods_dir.clone();
        fs::write(live.join("one.pak"), "1").unwrap();
        let (profile, _) = create_from_live(&mut registry, "Rolling").unwrap();

        fs::write(live.join("two.pak"), "2").unwrap();
        refresh_from_live(&registry, &profile).unwrap();

        assert_eq!(file_set(&profile.mods_dir()), file_set(&live));
        assert!(profile.mods_dir().join("two.pak").is_file());
    }

    #[test]
    fn activate_replaces_live_contents_and_launches() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup_registry(&temp);
        let live = registry.settings().live_mods_dir.clone();
        fs::write(live.join("keep.pak"), "k").unwrap();
        let (profile, _) = create_from_live(&mut registry, "Keep").unwrap();

        // Drift the live folder away from the snapshot.
        fs::remove_file(live.join("keep.pak")).unwrap();
        fs::write(live.join("leftover.pak"), "x").unwrap();

        let launched = Cell::new(false);
        activate_with(&registry, &profile, || {
            launched.set(true);
            Ok(())
        })
        .unwrap();

        assert!(launched.get());
        assert_eq!(file_set(&live), file_set(&profile.mods_dir()));
        assert!(!live.join("leftover.pak").exists());
    }

    #[test]
    fn activate_with_a_missing_snapshot_leaves_live_untouched() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup_registry(&temp);
        let live = registry.settings().live_mods_dir.clone();
        fs::write(live.join("precious.pak"), "p").unwrap();
        let profile = create_empty(&mut registry, "Empty").unwrap();
        fs::remove_dir_all(profile.mods_dir()).unwrap();

        let launched = Cell::new(false);
        let result = activate_with(&registry, &profile, || {
            launched.set(true);
            Ok(())
        });

        assert!(matches!(result, Err(Error::SourceMissing(_))));
        assert!(!launched.get());
        assert!(live.join("precious.pak").is_file());
    }

    #[test]
    fn delete_removes_tree_and_record() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup_registry(&temp);
        for name in ["Alpha", "Beta", "Gamma"] {
            create_empty(&mut registry, name).unwrap();
        }
        let storage = registry.get("Beta").unwrap().storage_path.clone();

        delete(&mut registry, "Beta").unwrap();

        assert!(!storage.exists());
        assert!(registry.get("Beta").is_none());
        for index in 1..=registry.len() {
            let found = registry.by_display_index(index).unwrap().unwrap();
            assert_ne!(found.name, "Beta");
        }
    }

    #[test]
    fn delete_with_an_already_missing_tree_still_deregisters() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup_registry(&temp);
        let profile = create_empty(&mut registry, "Ghost").unwrap();
        fs::remove_dir_all(&profile.storage_path).unwrap();

        delete(&mut registry, "Ghost").unwrap();
        assert!(registry.get("Ghost").is_none());
    }

    #[test]
    fn delete_of_an_unknown_name_is_not_found() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup_registry(&temp);
        assert!(matches!(
            delete(&mut registry, "Nobody"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn blank_settings_refuse_path_operations() {
        let temp = TempDir::new().unwrap();
        let store = Store::new(temp.path().join("Profile.ini"));
        let mut registry = ProfileRegistry::open(store, Settings::default(), Vec::new());

        assert!(matches!(
            create_empty(&mut registry, "X"),
            Err(Error::SettingsUnset)
        ));
    }
}
