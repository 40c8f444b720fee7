//! Shared helpers for the inline test modules.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::registry::ProfileRegistry;
use crate::store::{Settings, Store};

/// Build a registry over a temp layout mimicking a real install:
/// `game/Mods` as the live folder, the descriptor under
/// `game/PlayerProfiles/Public/`, and `storage` as the profile root.
pub fn setup_registry(temp: &TempDir) -> ProfileRegistry {
    let game = temp.path().join("game");
    let live = game.join("Mods");
    fs::create_dir_all(&live).unwrap();
    let public = game.join("PlayerProfiles").join("Public");
    fs::create_dir_all(&public).unwrap();
    fs::write(public.join("modsettings.lsx"), "<save><ModOrder/></save>").unwrap();

    let storage = temp.path().join("storage");
    fs::create_dir_all(&storage).unwrap();

    let settings = Settings {
        live_mods_dir: live,
        storage_dir: storage,
    };
    let store = Store::new(temp.path().join("Profile.ini"));
    store.save(&settings, &[]).unwrap();
    ProfileRegistry::open(store, settings, Vec::new())
}

/// Relative paths of every file under `root`, for file-set comparisons.
pub fn file_set(root: &Path) -> BTreeSet<String> {
    fn walk(root: &Path, dir: &Path, acc: &mut BTreeSet<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, acc);
            } else {
                acc.insert(
                    path.strip_prefix(root)
                        .unwrap()
                        .to_string_lossy()
                        .replace('\\', "/"),
                );
            }
        }
    }

    let mut acc = BTreeSet::new();
    if root.is_dir() {
        walk(root, root, &mut acc);
    }
    acc
}
