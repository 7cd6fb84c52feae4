//! Skin commands and the picker state machine.
//!
//! The controller is driven by discrete events. A command (`set_skin`,
//! `delete_user_skin`, `save_user_skin`) may open a picker or an input panel;
//! the host then reports what the user did through `on_highlight`,
//! `on_select`, `on_input_done` and `on_input_cancel`.
//!
//! ```text
//! Idle --set_skin()--> Picking --on_highlight--> Previewing --on_select(Some)--> apply --> Idle
//!                                                          \--on_select(None)--> revert --> Idle
//! ```
//!
//! Previews are deferred by the host. `on_highlight` hands out a
//! [`PreviewTicket`]; `preview` only touches settings if the ticket still
//! names the current highlight, so a burst of highlight events commits only
//! the last one.

use std::collections::BTreeMap;

use serde_json::Value;
use skins_host::{QuickPanelItem, ResourceAccess, Settings, SettingsStore, Window};
use skins_types::config::{SkinsConfig, default_template};
use skins_types::error::{Result, SkinsError};
use skins_types::value::{is_truthy, merge_into};

use crate::repository::SkinRepository;
use crate::skin::{PREFERENCES, Skin, SkinData};
use crate::stylesheet::{Template, parse_template, transform};
use crate::validator::is_valid;

const SKIN_ICON: &str = "💦 ";
const DELETE_ICON: &str = "🚮 ";
const UPDATE_ICON: &str = "🔃 ";
const SAVE_NEW: &str = "💾 Save as new skin ...";
const NAME_PROMPT: &str = "Enter skins name:";

/// Host collaborators, lent to the controller for the duration of a call.
pub struct Host<'a> {
    pub resources: &'a mut dyn ResourceAccess,
    pub settings: &'a mut dyn SettingsStore,
    pub window: &'a mut dyn Window,
}

/// Handle for a deferred preview of one picker row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTicket {
    /// Row the preview was scheduled for.
    pub index: usize,
    seq: u64,
}

/// Externally visible controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    /// Skin picker open, nothing highlighted yet.
    Picking,
    /// Skin picker open with a highlighted row.
    Previewing,
    /// Picker of user skins to delete.
    PickingDelete,
    /// Picker offering "save as new" or an existing user skin to update.
    PickingSave,
    /// Waiting for the name of a skin to save.
    AwaitingName,
}

/// Result of a command or event.
#[derive(Debug)]
pub enum Outcome {
    /// A skin was applied; carries its `package/name` identifier.
    Applied(String),
    /// The skin picker was cancelled and previews rolled back.
    Aborted,
    Saved(String),
    Deleted(String),
    /// A picker is open; answer with `on_select`.
    AwaitingSelection,
    /// An input panel is open; answer with `on_input_done`.
    AwaitingInput,
    /// The user cancelled a delete or save.
    Cancelled,
    /// There was nothing to act on.
    NothingToDo,
    /// The event did not fit the current state.
    Ignored,
    /// The command failed; the user has been told via the status bar.
    Failed(SkinsError),
}

/// Preference values overwritten during one picker session.
///
/// Records the value a key had before the first preview touched it; `None`
/// means the key did not exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    previous: BTreeMap<String, Option<Value>>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `current` as the original value of `key`, unless already known.
    pub fn record(&mut self, key: &str, current: Option<Value>) {
        self.previous.entry(key.to_string()).or_insert(current);
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }

    pub fn len(&self) -> usize {
        self.previous.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.previous.contains_key(key)
    }

    /// Put every recorded key back the way it was.
    pub fn restore(self, settings: &mut Settings) {
        for (key, previous) in self.previous {
            match previous {
                Some(value) => settings.set(&key, value),
                None => {
                    settings.erase(&key);
                },
            }
        }
    }
}

#[derive(Debug)]
struct Picker {
    skins: Vec<Skin>,
    changes: ChangeSet,
    highlighted: Option<usize>,
    seq: u64,
}

#[derive(Debug)]
enum Session {
    Idle,
    Picking(Picker),
    PickingDelete(Vec<String>),
    PickingSave(Vec<String>),
    AwaitingName,
}

/// Runs the skin commands against a host.
#[derive(Debug)]
pub struct SkinController {
    config: SkinsConfig,
    repository: SkinRepository,
    session: Session,
    seq: u64,
}

impl SkinController {
    pub fn new(config: SkinsConfig) -> Self {
        let repository = SkinRepository::new(&config);
        Self {
            config,
            repository,
            session: Session::Idle,
            seq: 0,
        }
    }

    pub fn config(&self) -> &SkinsConfig {
        &self.config
    }

    pub fn repository(&self) -> &SkinRepository {
        &self.repository
    }

    pub fn state(&self) -> State {
        match &self.session {
            Session::Idle => State::Idle,
            Session::Picking(p) if p.highlighted.is_some() => State::Previewing,
            Session::Picking(_) => State::Picking,
            Session::PickingDelete(_) => State::PickingDelete,
            Session::PickingSave(_) => State::PickingSave,
            Session::AwaitingName => State::AwaitingName,
        }
    }

    /// Whether the delete command should be offered at all.
    pub fn is_delete_visible(&self, resources: &dyn ResourceAccess) -> bool {
        self.repository.has_user_skins(resources)
    }

    // -- set_skin ------------------------------------------------------------

    /// Apply `package/name` directly, or open the skin picker if either is
    /// missing.
    pub fn set_skin(
        &mut self,
        host: &mut Host<'_>,
        package: Option<&str>,
        name: Option<&str>,
    ) -> Outcome {
        self.end_session(host);

        let (Some(package), Some(name)) = (package, name) else {
            return self.show_skin_picker(host);
        };
        match self.repository.load_one(&*host.resources, package, name) {
            Ok(skin) => {
                self.apply(host, &skin);
                Outcome::Applied(skin.id())
            },
            Err(e) => {
                let message = match &e {
                    SkinsError::SkinInvalid(_) => format!("Invalid skin {package}/{name}!"),
                    _ => format!("Skin {package}/{name} not found!"),
                };
                host.window.status_message(&message);
                Outcome::Failed(e)
            },
        }
    }

    fn show_skin_picker(&mut self, host: &mut Host<'_>) -> Outcome {
        let skins: Vec<Skin> = self.repository.enumerate_all(&*host.resources).collect();
        if skins.is_empty() {
            host.window.status_message("No skins found!");
            return Outcome::NothingToDo;
        }

        let active = self.active_skin(host.settings);
        let selected = active
            .as_deref()
            .and_then(|id| skins.iter().position(|s| s.id() == id));
        let items = skins
            .iter()
            .map(|s| QuickPanelItem::new(format!("{SKIN_ICON}{}", s.name), s.package.clone()))
            .collect();

        log::debug!("Showing {} skins, active {active:?}", skins.len());
        self.session = Session::Picking(Picker {
            skins,
            changes: ChangeSet::new(),
            highlighted: None,
            seq: self.seq,
        });
        host.window.show_quick_panel(items, selected);
        Outcome::AwaitingSelection
    }

    fn active_skin(&self, settings: &mut dyn SettingsStore) -> Option<String> {
        let prefs = settings.load_settings(&self.config.preferences).ok()?;
        prefs
            .get(&self.config.active_skin_key)?
            .as_str()
            .map(str::to_string)
    }

    /// The user moved the picker highlight to `index`.
    ///
    /// Returns a ticket for the host to pass to [`Self::preview`] once its
    /// debounce delay (`preview_delay_ms`) has elapsed.
    pub fn on_highlight(&mut self, index: usize) -> Option<PreviewTicket> {
        let Session::Picking(picker) = &mut self.session else {
            return None;
        };
        if index >= picker.skins.len() {
            return None;
        }
        self.seq += 1;
        picker.highlighted = Some(index);
        picker.seq = self.seq;
        Some(PreviewTicket {
            index,
            seq: self.seq,
        })
    }

    /// Temporarily apply the `Preferences` of the highlighted skin.
    ///
    /// No-op (returns false) if the highlight moved since the ticket was
    /// issued or the picker is gone.
    pub fn preview(&mut self, host: &mut Host<'_>, ticket: PreviewTicket) -> bool {
        let Session::Picking(picker) = &mut self.session else {
            log::debug!("Preview of row {} dropped: picker closed", ticket.index);
            return false;
        };
        if picker.highlighted != Some(ticket.index) || picker.seq != ticket.seq {
            log::debug!("Preview of row {} dropped: stale", ticket.index);
            return false;
        }
        let Some(entries) = picker.skins[ticket.index].data.preferences() else {
            return false;
        };
        let prefs = match host.settings.load_settings(&self.config.preferences) {
            Ok(prefs) => prefs,
            Err(e) => {
                log::warn!("Skins: preview failed: {e}");
                return false;
            },
        };
        for (key, value) in entries {
            picker.changes.record(key, prefs.get(key).cloned());
            if is_truthy(value) {
                prefs.set(key, value.clone());
            } else {
                prefs.erase(key);
            }
        }
        true
    }

    /// The user confirmed row `index`, or cancelled with `None`.
    pub fn on_select(&mut self, host: &mut Host<'_>, index: Option<usize>) -> Outcome {
        match std::mem::replace(&mut self.session, Session::Idle) {
            Session::Idle => Outcome::Ignored,
            Session::AwaitingName => {
                self.session = Session::AwaitingName;
                Outcome::Ignored
            },
            Session::Picking(picker) => self.finish_picking(host, picker, index),
            Session::PickingDelete(names) => match index.and_then(|i| names.get(i)) {
                Some(name) => self.delete_named(host, name),
                None => Outcome::Cancelled,
            },
            Session::PickingSave(names) => match index {
                Some(0) => self.prompt_for_name(host),
                Some(i) => match names.get(i - 1) {
                    Some(name) => self.save_named(host, name),
                    None => Outcome::Cancelled,
                },
                None => Outcome::Cancelled,
            },
        }
    }

    fn finish_picking(
        &mut self,
        host: &mut Host<'_>,
        mut picker: Picker,
        index: Option<usize>,
    ) -> Outcome {
        let chosen = index.filter(|&i| i < picker.skins.len());
        match chosen {
            Some(i) => {
                let skin = picker.skins.swap_remove(i);
                self.apply(host, &skin);
                Outcome::Applied(skin.id())
            },
            None => {
                log::debug!("Picker aborted, restoring {} key(s)", picker.changes.len());
                self.revert(host, picker.changes);
                Outcome::Aborted
            },
        }
    }

    fn revert(&self, host: &mut Host<'_>, changes: ChangeSet) {
        let ns = &self.config.preferences;
        match host.settings.load_settings(ns) {
            Ok(prefs) => changes.restore(prefs),
            Err(e) => {
                log::error!("Skins: could not restore preferences: {e}");
                return;
            },
        }
        if let Err(e) = host.settings.save_settings(ns) {
            log::error!("Skins: could not save preferences: {e}");
        }
    }

    /// Drop whatever session is open, rolling back unconfirmed previews.
    fn end_session(&mut self, host: &mut Host<'_>) {
        if let Session::Picking(picker) = std::mem::replace(&mut self.session, Session::Idle) {
            if !picker.changes.is_empty() {
                self.revert(host, picker.changes);
            }
        }
    }

    // -- apply ---------------------------------------------------------------

    /// Write every section of `skin` into its settings namespace.
    ///
    /// Best effort: a namespace that fails to load or save is logged and
    /// skipped, the others are still applied.
    pub fn apply(&self, host: &mut Host<'_>, skin: &Skin) {
        let id = skin.id();
        let prefs_ns = &self.config.preferences;
        match host.settings.load_settings(prefs_ns) {
            Ok(prefs) => prefs.set(&self.config.active_skin_key, Value::String(id.clone())),
            Err(e) => log::error!("Skins: could not record active skin: {e}"),
        }

        for (section, entries) in skin.data.sections() {
            if let Err(e) = apply_section(host.settings, section, entries) {
                log::error!("Skins: applying {section} of {id} failed: {e}");
            }
        }
        if !skin.data.has_section(prefs_ns) {
            if let Err(e) = host.settings.save_settings(prefs_ns) {
                log::error!("Skins: could not save {prefs_ns}: {e}");
            }
        }

        log::info!("Applied skin {id}");
        host.window.status_message(&format!("Skin {id} applied!"));
    }

    // -- delete_user_skin ----------------------------------------------------

    /// Delete a saved skin by name, or open a picker of saved skins.
    pub fn delete_user_skin(&mut self, host: &mut Host<'_>, name: Option<&str>) -> Outcome {
        self.end_session(host);

        let skins = self.repository.load_user_collection(&*host.resources);
        if skins.is_empty() {
            host.window.status_message("No user skins to delete!");
            return Outcome::Failed(SkinsError::EmptyCollection);
        }
        if let Some(name) = name {
            return self.delete_named(host, name);
        }

        let names: Vec<String> = skins.into_keys().collect();
        let items = names
            .iter()
            .map(|n| QuickPanelItem::new(format!("{DELETE_ICON}{n}"), "Delete existing skin."))
            .collect();
        self.session = Session::PickingDelete(names);
        host.window.show_quick_panel(items, None);
        Outcome::AwaitingSelection
    }

    fn delete_named(&mut self, host: &mut Host<'_>, name: &str) -> Outcome {
        let mut skins = self.repository.load_user_collection(&*host.resources);
        if skins.remove(name).is_none() {
            host.window.status_message("Skin not deleted!");
            return Outcome::Failed(SkinsError::SkinNotFound(format!("User/{name}")));
        }
        match self.repository.save_user_collection(host.resources, &skins) {
            Ok(()) => {
                host.window.status_message(&format!("Skin {name} deleted!"));
                Outcome::Deleted(name.to_string())
            },
            Err(e) => {
                log::error!("Skins: deleting {name} failed: {e}");
                host.window.status_message("Skin not deleted!");
                Outcome::Failed(e)
            },
        }
    }

    // -- save_user_skin ------------------------------------------------------

    /// Save the current visual settings as a user skin.
    ///
    /// Without a name, asks for one: directly through an input panel when the
    /// user has no saved skins, otherwise through a picker that also offers
    /// updating an existing skin.
    pub fn save_user_skin(&mut self, host: &mut Host<'_>, name: Option<&str>) -> Outcome {
        self.end_session(host);

        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            return self.save_named(host, name);
        }

        let skins = self.repository.load_user_collection(&*host.resources);
        if skins.is_empty() {
            return self.prompt_for_name(host);
        }
        let names: Vec<String> = skins.into_keys().collect();
        let items = std::iter::once(QuickPanelItem::new(
            SAVE_NEW,
            "Enter the name in the following input panel, please.",
        ))
        .chain(
            names
                .iter()
                .map(|n| QuickPanelItem::new(format!("{UPDATE_ICON}{n}"), "Update existing skin.")),
        )
        .collect();
        self.session = Session::PickingSave(names);
        host.window.show_quick_panel(items, None);
        Outcome::AwaitingSelection
    }

    fn prompt_for_name(&mut self, host: &mut Host<'_>) -> Outcome {
        self.session = Session::AwaitingName;
        host.window.show_input_panel(NAME_PROMPT, "");
        Outcome::AwaitingInput
    }

    /// The user entered a skin name.
    pub fn on_input_done(&mut self, host: &mut Host<'_>, text: &str) -> Outcome {
        if !matches!(self.session, Session::AwaitingName) {
            return Outcome::Ignored;
        }
        self.session = Session::Idle;
        match text.trim() {
            "" => Outcome::Cancelled,
            name => self.save_named(host, name),
        }
    }

    /// The user dismissed the input panel.
    pub fn on_input_cancel(&mut self) -> Outcome {
        if !matches!(self.session, Session::AwaitingName) {
            return Outcome::Ignored;
        }
        self.session = Session::Idle;
        Outcome::Cancelled
    }

    fn save_named(&mut self, host: &mut Host<'_>, name: &str) -> Outcome {
        let template = self.load_template(host.settings);
        let skin = assemble(host.settings, &template);

        if !is_valid(&skin, &*host.resources) {
            host.window
                .status_message(&format!("Invalid skin {name} not saved!"));
            return Outcome::Failed(SkinsError::SkinInvalid(name.to_string()));
        }

        let mut skins = self.repository.load_user_collection(&*host.resources);
        skins.insert(name.to_string(), skin);
        match self.repository.save_user_collection(host.resources, &skins) {
            Ok(()) => {
                host.window.status_message(&format!("Saved skin {name}!"));
                Outcome::Saved(name.to_string())
            },
            Err(e) => {
                log::error!("Skins: saving {name} failed: {e}");
                host.window.status_message(&format!("Skin {name} not saved!"));
                Outcome::Failed(e)
            },
        }
    }

    /// The configured skin template, or the built-in one.
    fn load_template(&self, settings: &mut dyn SettingsStore) -> Template {
        let configured = settings
            .load_settings(&self.config.skins_settings)
            .ok()
            .and_then(|s| s.get(&self.config.template_key).cloned());
        if let Some(value) = configured {
            match parse_template(value) {
                Ok(template) => return template,
                Err(e) => log::warn!("Skins: bad {}: {e}", self.config.template_key),
            }
        } else {
            log::warn!("Skins: no {} configured -- using default", self.config.template_key);
        }
        parse_template(default_template()).unwrap_or_default()
    }
}

fn apply_section(
    settings: &mut dyn SettingsStore,
    namespace: &str,
    entries: &serde_json::Map<String, Value>,
) -> Result<()> {
    let target = settings.load_settings(namespace)?;
    for (key, value) in entries {
        match value {
            Value::Object(update) => {
                let merged = merge_into(target.get(key).cloned(), update);
                target.set(key, merged);
            },
            v if is_truthy(v) => target.set(key, v.clone()),
            _ => {
                target.erase(key);
            },
        }
    }
    settings.save_settings(namespace)
}

/// Build a skin from the live settings of each namespace in `template`.
fn assemble(settings: &mut dyn SettingsStore, template: &Template) -> SkinData {
    let mut skin = SkinData::new();
    for (namespace, stylesheet) in template {
        let snapshot = match settings.load_settings(namespace) {
            Ok(s) => Value::Object(s.as_map().clone()),
            Err(e) => {
                log::warn!("Skins: skipping {namespace}: {e}");
                continue;
            },
        };
        if let Some(section) = transform(&snapshot, stylesheet) {
            skin.insert_section(namespace, section);
        }
    }
    if !skin.has_section(PREFERENCES) {
        log::debug!("Skins: assembled skin has no {PREFERENCES} section");
    }
    skin
}
