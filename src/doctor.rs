//! Setup health check, run from the menu.
//!
//! Profile records and the directories they reference can drift apart
//! (directories deleted or moved outside this tool); the registry accepts
//! that gap, so this is where it gets surfaced to the user.

use anstyle::AnsiColor;

use crate::fs_utils::dir_size;
use crate::paths::GamePaths;
use crate::registry::ProfileRegistry;
use crate::ui::{Ui, format_bytes};

pub fn run_doctor(registry: &ProfileRegistry, ui: &Ui) {
    ui.section("Setup health check");
    ui.newline();

    check_step(ui, "Backing file", || {
        let path = registry.store().path();
        if path.exists() {
            ui.println(format!("  {} {} present", ui.icon_ok(), path.display()));
        } else {
            ui.println(format!(
                "  {} {} not written yet (first mutation will create it)",
                ui.icon_warn(),
                path.display()
            ));
        }
        true
    });

    let configured = registry.settings().is_configured();
    let paths = configured.then(|| GamePaths::from_settings(registry.settings()));

    check_step(ui, "Configured folders", || {
        let Some(paths) = &paths else {
            ui.println(format!(
                "  {} game folders not configured; run setup from the menu",
                ui.icon_err()
            ));
            return false;
        };

        let mut ok = true;
        if paths.live_mods_dir.is_dir() {
            ui.println(format!(
                "  {} live mods folder: {}",
                ui.icon_ok(),
                paths.live_mods_dir.display()
            ));
        } else {
            ui.println(format!(
                "  {} live mods folder missing: {}",
                ui.icon_err(),
                paths.live_mods_dir.display()
            ));
            ok = false;
        }

        if paths.storage_dir.is_dir() {
            ui.println(format!(
                "  {} profile storage folder: {}",
                ui.icon_ok(),
                paths.storage_dir.display()
            ));
        } else {
            ui.println(format!(
                "  {} profile storage folder missing: {}",
                ui.icon_err(),
                paths.storage_dir.display()
            ));
            ok = false;
        }

        if paths.live_descriptor.is_file() {
            ui.println(format!("  {} mod-list descriptor present", ui.icon_ok()));
        } else {
            ui.println(format!(
                "  {} mod-list descriptor missing: {} (the game may not have written it yet)",
                ui.icon_warn(),
                paths.live_descriptor.display()
            ));
        }
        ok
    });

    check_step(ui, "Profiles", || {
        if registry.is_empty() {
            ui.println(format!("  {} no profiles yet", ui.icon_info()));
            return true;
        }

        let mut all_ok = true;
        for profile in registry.all() {
            if !profile.storage_path.is_dir() {
                ui.println(format!(
                    "    {} {} (storage folder missing: {})",
                    ui.icon_err(),
                    profile.name,
                    profile.storage_path.display()
                ));
                all_ok = false;
                continue;
            }

            let mut notes = Vec::new();
            if !profile.mods_dir().is_dir() {
                notes.push("no Mods folder");
                all_ok = false;
            }
            if !profile.descriptor_file().is_file() {
                notes.push("no descriptor snapshot");
            }
            if let Some(paths) = &paths {
                if profile.storage_path != paths.profile_dir(&profile.name) {
                    notes.push("stored outside the storage root");
                }
            }

            if notes.is_empty() {
                let size = dir_size(&profile.storage_path).unwrap_or(0);
                ui.println(format!(
                    "    {} {} ({})",
                    ui.icon_ok(),
                    profile.name,
                    format_bytes(size)
                ));
            } else {
                ui.println(format!(
                    "    {} {} ({})",
                    ui.icon_warn(),
                    profile.name,
                    notes.join(", ")
                ));
            }
        }
        all_ok
    });
}

fn check_step<F>(ui: &Ui, name: &str, check_fn: F)
where
    F: FnOnce() -> bool,
{
    ui.println(ui.bold(format!("Checking {}...", name)));
    if !check_fn() {
        ui.println(ui.colored("  Issues detected!", AnsiColor::Red));
    }
    ui.newline();
}
