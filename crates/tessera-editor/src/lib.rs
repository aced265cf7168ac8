//! Host-facing facade for the Tessera editor core.
//!
//! A host loads an [`EditorConfig`], picks a [`BlockRepository`], and drives
//! everything else through [`Editor`]:
//!
//! ```text
//! EditorConfig ──► Editor ──► LicenseService   (tier, allowed types, field filtering)
//!                    │
//!                    ├──► BlockRepository       (flat records, parent by id)
//!                    ├──► tessera-validation    (validate-then-commit)
//!                    └──► tessera-spacing       (styles, CSS, live breakpoint watches)
//! ```
//!
//! ```no_run
//! # async fn run() -> Result<(), tessera_editor::EditorError> {
//! use std::sync::Arc;
//! use tessera_editor::{Editor, EditorConfig, MemoryBlockRepository};
//!
//! let config = EditorConfig::load("editor.ron")?;
//! tessera_telemetry::init_logging(&config.log);
//! let editor = Editor::with_http_transport(config, Arc::new(MemoryBlockRepository::new()))?;
//! let block = editor.add_block("text", Default::default()).await?;
//! # let _ = block;
//! # Ok(())
//! # }
//! ```

mod config;
mod editor;
pub mod error;
mod repository;

pub use config::{DEFAULT_BLOCK_TYPES, EditorConfig, VerificationConfig};
pub use editor::Editor;
pub use error::{ConfigError, EditorError, RepositoryError, Result};
pub use repository::{BlockRepository, MemoryBlockRepository};
