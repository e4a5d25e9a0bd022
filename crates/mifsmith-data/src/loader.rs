//! Reads simulation descriptions from disk and replays them into a session.
//!
//! The format is detected from the file extension (RON, TOML or JSON). Paths
//! inside a description are relative to the description file.

use std::path::{Path, PathBuf};

use mifsmith_core::{MifError, Report, SessionConfig, write_simulation};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::schema::SimulationData;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading or rendering a description.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Neither the description nor the caller named an output file.
    #[error("no target given in {file} and no output path supplied")]
    MissingTarget { file: PathBuf },

    /// The description loaded but a block was rejected.
    #[error(transparent)]
    Mif(#[from] MifError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// RON options letting `Some` and block-kind wrappers be written implicitly:
/// `BoxAtlas(xrange: (0, 1e-7), ...)` instead of `BoxAtlas((xrange: Some(...)))`.
fn ron_options() -> ron::Options {
    ron::Options::default().with_default_extension(
        ron::extensions::Extensions::IMPLICIT_SOME | ron::extensions::Extensions::UNWRAP_VARIANT_NEWTYPES,
    )
}

/// Deserialize `content` according to `format`; `file` is only used in errors.
pub fn deserialize_str<T: DeserializeOwned>(content: &str, format: Format, file: &Path) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron_options()
            .from_str(content)
            .map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

/// Loads a simulation description.
pub fn load_simulation(path: &Path) -> Result<SimulationData, DataLoadError> {
    let data: SimulationData = deserialize_file(path)?;
    debug!(file = %path.display(), blocks = data.blocks.len(), "description loaded");
    Ok(data)
}

// ===========================================================================
// Rendering
// ===========================================================================

/// Caller overrides for where a description is rendered.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Output path; wins over the description's `target`.
    pub output: Option<PathBuf>,
    /// Basename; wins over the description's `basename`.
    pub basename: Option<String>,
}

/// Builds the session configuration for `data` loaded from `source`.
///
/// A `target` in the description is resolved against the directory holding
/// the description; an explicit output path is used as given.
pub fn session_config(
    data: &SimulationData,
    source: &Path,
    options: &RenderOptions,
) -> Result<SessionConfig, DataLoadError> {
    let target = match (&options.output, &data.target) {
        (Some(output), _) => output.clone(),
        (None, Some(target)) => match source.parent() {
            Some(dir) if target.is_relative() => dir.join(target),
            _ => target.clone(),
        },
        (None, None) => {
            return Err(DataLoadError::MissingTarget {
                file: source.to_path_buf(),
            });
        }
    };
    let mut config = SessionConfig::new(target);
    if let Some(basename) = options.basename.as_ref().or(data.basename.as_ref()) {
        config = config.basename(basename.clone());
    }
    Ok(config)
}

/// Declares every block of `data` in order into a fresh session.
pub fn render_simulation(data: &SimulationData, config: SessionConfig) -> Result<Report, MifError> {
    write_simulation(config, |session| {
        for block in &data.blocks {
            let spec = block.spec.as_specify();
            match &block.name {
                Some(name) => session.declare_named(name, spec)?,
                None => session.declare(spec)?,
            };
        }
        Ok(())
    })
}

/// Loads the description at `path` and renders it.
pub fn render_file(path: &Path, options: &RenderOptions) -> Result<Report, DataLoadError> {
    let data = load_simulation(path)?;
    let config = session_config(&data, path, options)?;
    Ok(render_simulation(&data, config)?)
}

// ===========================================================================
// Tests
// ===========================================================================
