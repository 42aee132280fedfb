//! Video playback speed control engine.
//!
//! The engine is split across three crates:
//!
//! - `vidrate-config`: the settings record, URL rule evaluation, and the
//!   settings file watcher
//! - `vidrate-keybindings`: shortcut canonicalization, the binding registry,
//!   and configuration-time recording
//! - this crate: the per-page speed controller, page sessions, the settings
//!   broker that fans out changes, and backup import/export
//!
//! An embedding host (the CLI binary here; a browser bridge elsewhere) opens
//! a [`broker::SettingsBroker`], creates one [`session::PageSession`] per
//! page, and drives sessions with key events, media notifications, and a
//! periodic tick.

pub mod broker;
pub mod cli;
pub mod controller;
pub mod import_export;
pub mod logging;
pub mod session;
