//! Skins manager core.
//!
//! A skin is a named bundle of editor settings: a `Preferences` section that
//! must name a color scheme and a theme, plus optional per-package sections.
//! Skins ship in `*.skins` resources of any package; the user's own skins
//! live in a single `Saved Skins.skins` document.
//!
//! Everything here is host-agnostic. Resource lookup, settings storage and
//! pickers are reached through the traits of `skins_host`.

pub mod controller;
pub mod repository;
pub mod skin;
pub mod stylesheet;
pub mod validator;

pub use controller::{ChangeSet, Host, Outcome, PreviewTicket, SkinController, State};
pub use repository::SkinRepository;
pub use skin::{PREFERENCES, Skin, SkinCollection, SkinData};
pub use stylesheet::{Stylesheet, Template, transform};
pub use validator::{Resolved, is_valid, resolve};
