//! Directional copies between the live mods folder and profile storage.
//!
//! Both directions copy the mods tree and the mod-list descriptor. Copies
//! overwrite without merging: files present on both sides are replaced and
//! destination-only files are left untouched. A failure partway through a
//! multi-file copy leaves the destination partially overwritten; there is
//! no rollback.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::fs_utils::copy_dir_recursive;
use crate::paths::GamePaths;
use crate::store::Profile;

/// Snapshot the live mods folder and descriptor into a profile's storage.
///
/// Storage directories deleted behind the registry's back are recreated.
/// Returns the number of mod files copied.
pub fn export_live_to_profile(paths: &GamePaths, profile: &Profile) -> Result<u64> {
    let live = &paths.live_mods_dir;
    if !live.is_dir() {
        return Err(Error::SourceMissing(live.clone()));
    }

    let snapshot = profile.mods_dir();
    fs::create_dir_all(&snapshot)?;

    let copied =
        copy_dir_recursive(live, &snapshot).map_err(|err| copy_failed(live, &snapshot, err))?;
    copy_file(&paths.live_descriptor, &profile.descriptor_file())?;
    Ok(copied)
}

/// Replace the live mods folder and descriptor with a profile's snapshot.
///
/// The snapshot is verified before anything is destroyed, then the live
/// folder is cleared entirely so nothing from the previous mod set
/// survives the swap. Returns the number of mod files copied.
pub fn import_profile_to_live(paths: &GamePaths, profile: &Profile) -> Result<u64> {
    let snapshot = profile.mods_dir();
    if !snapshot.is_dir() {
        return Err(Error::SourceMissing(snapshot));
    }

    let live = &paths.live_mods_dir;
    if live.exists() {
        fs::remove_dir_all(live)?;
    }

    let copied =
        copy_dir_recursive(&snapshot, live).map_err(|err| copy_failed(&snapshot, live, err))?;
    copy_file(&profile.descriptor_file(), &paths.live_descriptor)?;
    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|err| copy_failed(from, to, err))?;
    }
    fs::copy(from, to).map_err(|err| copy_failed(from, to, err))?;
    Ok(())
}

fn copy_failed(from: &Path, to: &Path, source: io::Error) -> Error {
    Error::CopyFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    }
}
