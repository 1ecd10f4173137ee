//! Build pipeline module for the level compiler
//!
//! Compiles a directory of level files into level data and a progression
//! index.
//!
//! # Overview
//!
//! The build pipeline consists of:
//! - **Discovery**: list level files and order them by identifier
//! - **Compilation**: compile each file independently on a worker pool
//! - **Indexing**: once every file has a result, build the level index
//! - **Output**: write one JSON file per level plus `index.json`
//!
//! # Example
//!
//! ```no_run
//! use levelsrc::build::{BuildContext, BuildPipeline};
//! use levelsrc::config::default_config;
//!
//! let context = BuildContext::new(default_config(), std::path::PathBuf::from("."));
//! let result = BuildPipeline::new(context).build()?;
//! println!("{}", result.summary());
//! # Ok::<(), levelsrc::build::BuildError>(())
//! ```

pub mod context;
pub mod discovery;
pub mod pipeline;
pub mod progress;
pub mod result;

pub use context::*;
pub use discovery::*;
pub use pipeline::*;
pub use result::*;
