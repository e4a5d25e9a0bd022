//! Mifsmith Core -- validated generation of micromagnetic simulation input
//! files.
//!
//! A simulation is described as a sequence of blocks (atlases, meshes,
//! fields, energy terms, evolvers, drivers, scripts and output directives).
//! Each block is checked against everything declared before it and only
//! then appended to the output file.
//!
//! # Session Lifecycle
//!
//! 1. **Open** -- [`session::Session::open`] creates the parent directories,
//!    truncates the target and writes the header.
//! 2. **Declare** -- every [`blocks::Specify`] value is drafted against the
//!    [`registry::Registry`]. A draft that fails leaves the registry untouched;
//!    the session deletes the partial file and ignores later declarations.
//! 3. **Close** -- [`session::Session::close`] runs the finalizer and returns
//!    the collected [`finalize::Warning`]s.
//!
//! [`session::write_simulation`] wraps all three steps around a closure.
//!
//! ```rust,ignore
//! let report = write_simulation(SessionConfig::new("out/disk.mif"), |s| {
//!     s.declare_named("Brick", &brick)?;
//!     s.declare(&mesh)?;
//!     Ok(())
//! })?;
//! ```
//!
//! # Key Types
//!
//! - [`session::Session`] -- Owns the output file and the registry.
//! - [`registry::Registry`] -- Declared names, usage marks, destinations.
//! - [`draft::Draft`] -- Body lines and deferred registry effects of one block.
//! - [`error::Fault`] -- Why a single block was rejected.
//! - [`error::MifError`] -- Session-level failure carrying the block context.
//! - [`geometry::Extent`] -- Axis-aligned bounds with divisibility checks.

pub mod blocks;
pub mod draft;
pub mod error;
pub mod finalize;
pub mod format;
pub mod geometry;
pub mod registry;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use blocks::Specify;
pub use error::{Fault, MifError};
pub use finalize::Warning;
pub use session::{Closed, Report, Session, SessionConfig, write_simulation};
