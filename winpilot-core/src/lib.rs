//! `winpilot_core` -- desktop automation core for Windows.
//!
//! This crate contains all automation logic.  It can be consumed by:
//! - `winpilot-cli` (standalone CLI tools and the JSON IPC worker)
//! - `winpilot-ffi` (C ABI DLL for non-Rust hosts)
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | `AutomationError` enum via `thiserror` |
//! | [`config`] | Settle timings and output directory, loadable from JSON |
//! | [`keys`] | Key/modifier name tables and combo parsing |
//! | [`platform`] | OS seam traits and the Win32 backend |
//! | [`input`] | Keyboard and mouse synthesis with settle delays |
//! | [`window`] | Top-level window enumeration, lookup, focus and state |
//! | [`capture`] | Screen, region and window capture to PNG |
//! | [`macros`] | Macro command model and the serialized macro engine |
//! | [`tools`] | Single-shot entry points returning structured responses |
//!
//! Only [`platform::native`] touches the OS; everything else is written
//! against the traits in [`platform`].

pub mod capture;
pub mod config;
pub mod errors;
pub mod input;
pub mod keys;
pub mod macros;
pub mod platform;
pub mod tools;
pub mod window;

pub use errors::{AutomationError, ErrorKind, Result};
