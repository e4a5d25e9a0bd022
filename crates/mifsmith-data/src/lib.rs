//! Declarative simulation descriptions for Mifsmith.
//!
//! A description file (RON, TOML or JSON) lists the blocks of one simulation
//! in declaration order. [`loader::render_file`] loads it and replays every
//! block into a [`mifsmith_core::Session`].

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, RenderOptions, load_simulation, render_file, render_simulation};
pub use schema::{BlockData, SimulationData, SpecData};
