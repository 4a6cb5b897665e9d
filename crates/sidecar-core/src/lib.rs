#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! On-demand sidecar generation for imports with custom extensions.
//!
//! Lets a build pipeline resolve imports of arbitrary-extension files by
//! running a user transform over the source and resolving to the generated
//! output written next to it. Watch events keep generated files in sync as
//! sources change or disappear.
//!
//! ## Example
//!
//! ```ignore
//! use sidecar_core::{plugins, Options, TransformError};
//! use std::path::PathBuf;
//!
//! let built = plugins(vec![Options::new(
//!     ".graphql",
//!     |code: String, _path: PathBuf| async move {
//!         Ok::<_, TransformError>(format!("export default {code:?};"))
//!     },
//! )])?;
//! # Ok::<_, sidecar_core::Error>(())
//! ```

pub mod error;
pub mod generate;
pub mod matcher;
pub mod options;
pub mod resolve;
pub mod storage;

pub use error::Error;
pub use generate::SidecarPlugin;
pub use matcher::ExtensionSet;
pub use options::{
    plugin, plugins, IntoExtensions, Options, TransformError, TransformFn,
    DEFAULT_GENERATED_SUFFIX,
};
pub use resolve::{OsResolver, PathResolver};
pub use storage::{DiskStorage, MemoryStorage, Storage};
