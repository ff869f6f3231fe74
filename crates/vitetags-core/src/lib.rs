#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

//! Vite manifest integration for server-rendered pages.
//!
//! Resolves an entry point from Vite's `manifest.json` into the script,
//! stylesheet and preload tags a page needs, or points at the dev server when
//! one is running.

pub mod config;
pub mod context;
pub mod dev_server;
pub mod emitter;
pub mod error;
pub mod graph;
pub mod html;
pub mod manifest;
pub mod nonce;
pub mod options;
pub mod requirements;
pub mod urls;
pub mod version;

pub use config::{Config, Mode};
pub use context::AssetContext;
pub use dev_server::{DevServerProbe, DevServerState};
pub use error::{Error, Result};
pub use graph::{PreloadRequest, PreloadSet};
pub use manifest::{DanglingImport, Manifest, ManifestEntry, ManifestProvider, Resource};
pub use nonce::NonceSuppressionRegistry;
pub use options::{ScriptOptions, StyleOptions};
pub use requirements::{Requirements, RequirementsBuffer, ScriptAttributes, StyleAttributes};
pub use urls::{NonceStyle, ResourceUrlGenerator, SimpleUrlGenerator};
pub use version::{SCHEMA_VERSION, VERSION};
