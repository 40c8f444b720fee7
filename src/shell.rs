//! The interactive menu loop.
//!
//! This is the coordination layer between the user and the rest of the
//! crate: it loads (or bootstraps) the store, re-presents the menu until
//! the session ends, and maps every operation failure to a printed message
//! followed by a return to the menu. Leaving is a value returned from
//! dispatch, never shared state.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anstyle::AnsiColor;
use anyhow::{Context, Result};
use inquire::validator::Validation;
use inquire::{Confirm, CustomType, Select, Text};

use crate::doctor::run_doctor;
use crate::error::Error;
use crate::fs_utils::dir_size;
use crate::lifecycle;
use crate::paths::GamePaths;
use crate::registry::ProfileRegistry;
use crate::store::{Profile, Settings, Store};
use crate::ui::{Ui, format_bytes};

/// What the loop should do after a dispatched action.
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Activate,
    CreateEmpty,
    CreateFromLive,
    RefreshFromLive,
    Delete,
    Setup,
    Doctor,
    Quit,
}

impl MenuAction {
    const ALL: [MenuAction; 8] = [
        MenuAction::Activate,
        MenuAction::CreateEmpty,
        MenuAction::CreateFromLive,
        MenuAction::RefreshFromLive,
        MenuAction::Delete,
        MenuAction::Setup,
        MenuAction::Doctor,
        MenuAction::Quit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuAction::Activate => "Select a profile and launch the game",
            MenuAction::CreateEmpty => "Create a new empty profile",
            MenuAction::CreateFromLive => "Create a new profile from the current mods folder",
            MenuAction::RefreshFromLive => "Update a profile from the current mods folder",
            MenuAction::Delete => "Delete a profile",
            MenuAction::Setup => "Set up game folders",
            MenuAction::Doctor => "Check setup health",
            MenuAction::Quit => "Quit",
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Load the store (running first-time setup if needed) and run the menu
/// until the user quits or activates a profile.
pub fn run(store_path: &Path, ui: &Ui) -> Result<()> {
    let store = Store::new(store_path);
    let mut registry = startup(store, ui)?;

    loop {
        ui.newline();
        let Some(action) = Select::new("What would you like to do?", MenuAction::ALL.to_vec())
            .prompt_skippable()
            .context("menu prompt failed")?
        else {
            return Ok(());
        };

        match dispatch(action, &mut registry, ui) {
            Ok(Flow::Quit) => return Ok(()),
            Ok(Flow::Continue) => {}
            Err(err) => {
                // Nothing past startup is fatal: report and show the menu again.
                ui.err(format!("{err:#}"));
                if err
                    .downcast_ref::<Error>()
                    .is_some_and(|e| matches!(e, Error::SettingsUnset))
                {
                    ui.info("Pick \"Set up game folders\" from the menu first.");
                }
            }
        }
    }
}

fn startup(store: Store, ui: &Ui) -> Result<ProfileRegistry> {
    match store.load() {
        Ok(Some(document)) => Ok(ProfileRegistry::open(
            store,
            document.settings,
            document.profiles,
        )),
        Ok(None) => {
            ui.info(format!(
                "No {} found, running first-time setup.",
                store.path().display()
            ));
            let settings = setup_wizard(ui)?;
            store.save(&settings, &[])?;
            ui.ok(format!("Created {}.", store.path().display()));
            Ok(ProfileRegistry::open(store, settings, Vec::new()))
        }
        Err(err @ Error::MalformedDocument { .. }) => {
            ui.err(err.to_string());
            let moved = store.quarantine()?;
            ui.warn(format!(
                "Moved the unreadable file to {}; continuing with blank settings.",
                moved.display()
            ));
            Ok(ProfileRegistry::open(store, Settings::default(), Vec::new()))
        }
        Err(err) => Err(err.into()),
    }
}

fn dispatch(action: MenuAction, registry: &mut ProfileRegistry, ui: &Ui) -> Result<Flow> {
    match action {
        MenuAction::Activate => activate(registry, ui),
        MenuAction::CreateEmpty => {
            create_empty(registry, ui)?;
            Ok(Flow::Continue)
        }
        MenuAction::CreateFromLive => {
            create_from_live(registry, ui)?;
            Ok(Flow::Continue)
        }
        MenuAction::RefreshFromLive => {
            refresh_from_live(registry, ui)?;
            Ok(Flow::Continue)
        }
        MenuAction::Delete => {
            delete(registry, ui)?;
            Ok(Flow::Continue)
        }
        MenuAction::Setup => {
            let settings = setup_wizard(ui)?;
            lifecycle::reconfigure(registry, settings)?;
            ui.ok("Settings updated.");
            Ok(Flow::Continue)
        }
        MenuAction::Doctor => {
            run_doctor(registry, ui);
            Ok(Flow::Continue)
        }
        MenuAction::Quit => Ok(Flow::Quit),
    }
}

/// Activation ends the session: the game is starting and the live folder
/// now belongs to it.
fn activate(registry: &mut ProfileRegistry, ui: &Ui) -> Result<Flow> {
    let Some(profile) = choose_profile(registry, ui)? else {
        return Ok(Flow::Continue);
    };

    let spinner = ui.spinner(format!("Loading the '{}' profile...", profile.name));
    match lifecycle::activate(registry, &profile) {
        Ok(copied) => {
            ui.spinner_finish_ok(
                &spinner,
                format!(
                    "'{}' is now the live mod set ({copied} files). Enjoy your game!",
                    profile.name
                ),
            );
            Ok(Flow::Quit)
        }
        Err(err) => {
            ui.spinner_finish_err(&spinner, format!("Could not load '{}'", profile.name));
            Err(err.into())
        }
    }
}

fn create_empty(registry: &mut ProfileRegistry, ui: &Ui) -> Result<()> {
    let Some(name) = prompt_profile_name()? else {
        return Ok(());
    };
    let profile = lifecycle::create_empty(registry, &name)?;
    ui.ok(format!(
        "Created profile '{}' at {}.",
        profile.name,
        profile.storage_path.display()
    ));
    Ok(())
}

fn create_from_live(registry: &mut ProfileRegistry, ui: &Ui) -> Result<()> {
    let Some(name) = prompt_profile_name()? else {
        return Ok(());
    };

    let spinner = ui.spinner("Copying the current mods folder...");
    match lifecycle::create_from_live(registry, &name) {
        Ok((profile, copied)) => {
            ui.spinner_finish_ok(
                &spinner,
                format!("Created '{}' from the live mods folder ({copied} files).", profile.name),
            );
            Ok(())
        }
        Err(err) => {
            ui.spinner_finish_err(&spinner, format!("Could not create '{name}'"));
            Err(err.into())
        }
    }
}

fn refresh_from_live(registry: &mut ProfileRegistry, ui: &Ui) -> Result<()> {
    let Some(profile) = choose_profile(registry, ui)? else {
        return Ok(());
    };

    let spinner = ui.spinner(format!("Updating '{}' from the live mods folder...", profile.name));
    match lifecycle::refresh_from_live(registry, &profile) {
        Ok(copied) => {
            ui.spinner_finish_ok(&spinner, format!("Updated '{}' ({copied} files).", profile.name));
            Ok(())
        }
        Err(err) => {
            ui.spinner_finish_err(&spinner, format!("Could not update '{}'", profile.name));
            Err(err.into())
        }
    }
}

fn delete(registry: &mut ProfileRegistry, ui: &Ui) -> Result<()> {
    let Some(profile) = choose_profile(registry, ui)? else {
        return Ok(());
    };

    let confirmed = Confirm::new(&format!("Delete profile '{}'?", profile.name))
        .with_default(false)
        .with_help_message("Removes the stored snapshot and the registry entry")
        .prompt_skippable()
        .context("confirmation prompt failed")?
        .unwrap_or(false);
    if !confirmed {
        ui.warn("Deletion cancelled.");
        return Ok(());
    }

    lifecycle::delete(registry, &profile.name)?;
    ui.ok(format!("Deleted profile '{}'.", profile.name));
    Ok(())
}

/// Print the numbered profile listing and prompt for an entry.
///
/// The numbering is 1-based and matches the registry's display-index
/// lookup; 0 (or Esc) goes back to the menu.
fn choose_profile(registry: &ProfileRegistry, ui: &Ui) -> Result<Option<Profile>> {
    if registry.is_empty() {
        ui.warn("No profiles yet. Create one from the menu first.");
        return Ok(None);
    }

    ui.println(format!("{} profile(s) found:", registry.len()));
    let mut table = ui.simple_table();
    table.set_header(vec![
        ui.header_cell("#"),
        ui.header_cell("Profile"),
        ui.header_cell("Snapshot"),
        ui.header_cell("Size"),
    ]);
    for (index, profile) in registry.all().iter().enumerate() {
        let mods = profile.mods_dir();
        let (snapshot, size) = if mods.is_dir() {
            let size = dir_size(&profile.storage_path).unwrap_or(0);
            (
                ui.colored_cell("on disk", AnsiColor::Green),
                ui.cell(format_bytes(size)),
            )
        } else {
            (ui.colored_cell("missing", AnsiColor::Red), ui.cell("-"))
        };
        table.add_row(vec![
            ui.cell((index + 1).to_string()),
            ui.cell(&profile.name),
            snapshot,
            size,
        ]);
    }
    ui.println(table.to_string());

    let max = registry.len();
    let choice = CustomType::<usize>::new(&format!("Choose a profile by number [0-{max}, 0 goes back]:"))
        .with_validator(move |value: &usize| {
            if *value <= max {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(
                    format!("enter a number between 0 and {max}").into(),
                ))
            }
        })
        .with_error_message("enter a whole number")
        .prompt_skippable()
        .context("profile prompt failed")?;

    let Some(choice) = choice else {
        return Ok(None);
    };
    Ok(registry.by_display_index(choice)?.cloned())
}

fn prompt_profile_name() -> Result<Option<String>> {
    let name = Text::new("Profile name:")
        .with_help_message("1-25 characters; Esc to go back")
        .with_validator(|input: &str| match lifecycle::validate_profile_name(input) {
            Ok(()) => Ok(Validation::Valid),
            Err(err) => Ok(Validation::Invalid(err.to_string().into())),
        })
        .prompt_skippable()
        .context("name prompt failed")?;
    Ok(name)
}

/// Collect both folder paths interactively. The storage folder is created
/// if needed; a missing live folder is only a warning, since the game may
/// simply not have written any mods yet.
fn setup_wizard(ui: &Ui) -> Result<Settings> {
    let mut live_prompt =
        Text::new("Where does the game read mods from?").with_validator(required_path);
    let suggestion = GamePaths::default_live_mods().map(|p| p.to_string_lossy().into_owned());
    if let Some(suggested) = &suggestion {
        live_prompt = live_prompt.with_initial_value(suggested);
    }
    let live = live_prompt.prompt().context("setup cancelled")?;

    let storage = Text::new("Where should profiles be stored?")
        .with_validator(required_path)
        .with_help_message("Created if it does not exist")
        .prompt()
        .context("setup cancelled")?;

    let settings = Settings {
        live_mods_dir: PathBuf::from(live.trim()),
        storage_dir: PathBuf::from(storage.trim()),
    };

    fs::create_dir_all(&settings.storage_dir).with_context(|| {
        format!(
            "failed to create the storage folder {}",
            settings.storage_dir.display()
        )
    })?;
    if !settings.live_mods_dir.is_dir() {
        ui.warn(format!(
            "{} does not exist yet; the game may not have written any mods.",
            settings.live_mods_dir.display()
        ));
    }
    Ok(settings)
}

fn required_path(input: &str) -> std::result::Result<Validation, inquire::CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("a folder path is required".into()))
    } else {
        Ok(Validation::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_covers_every_operation_and_ends_with_quit() {
        assert_eq!(MenuAction::ALL.len(), 8);
        assert_eq!(MenuAction::ALL.last(), Some(&MenuAction::Quit));
    }

    #[test]
    fn menu_labels_are_distinct() {
        let labels: std::collections::HashSet<_> =
            MenuAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels.len(), MenuAction::ALL.len());
    }
}
