//! Error taxonomy for block construction and session management.
//!
//! A [`Fault`] is what a single block construction reports: it names the
//! offending parameter and never knows which block it belongs to. The session
//! wraps it into [`MifError::Block`] together with the block class and name
//! before handing it to the caller.

use std::path::PathBuf;

use crate::geometry::GeometryError;

/// Why a block construction was rejected. Every fault is fatal to the
/// session that raised it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Fault {
    /// A mandatory option was not supplied, or a prerequisite entity does not
    /// exist yet.
    #[error("{parameter} invalid: {reason}")]
    Configuration { parameter: String, reason: String },

    /// A supplied value is out of range, malformed or inconsistent.
    #[error("{parameter} invalid: {reason}")]
    Validation { parameter: String, reason: String },

    /// A name was not found among the declared entities of the expected kind.
    #[error(
        "{parameter} invalid: '{value}' is not a known {expected_kind} in [{}]",
        .valid.join(", ")
    )]
    UndefinedReference {
        parameter: String,
        value: String,
        expected_kind: String,
        valid: Vec<String>,
    },

    /// A name or destination label is already taken in this session.
    #[error("name invalid: '{name}' already in use")]
    DuplicateName { name: String },
}

impl Fault {
    /// A mandatory option that was left out.
    pub fn missing(parameter: &str) -> Self {
        Fault::Configuration {
            parameter: parameter.to_string(),
            reason: "mandatory argument not provided".to_string(),
        }
    }

    pub fn configuration(parameter: &str, reason: impl Into<String>) -> Self {
        Fault::Configuration {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub fn validation(parameter: &str, reason: impl Into<String>) -> Self {
        Fault::Validation {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    /// The parameter this fault is about.
    pub fn parameter(&self) -> &str {
        match self {
            Fault::Configuration { parameter, .. }
            | Fault::Validation { parameter, .. }
            | Fault::UndefinedReference { parameter, .. } => parameter,
            Fault::DuplicateName { .. } => "name",
        }
    }
}

impl From<GeometryError> for Fault {
    fn from(e: GeometryError) -> Self {
        match e {
            GeometryError::Reversed { axis, .. } => Fault::Validation {
                parameter: format!("{axis}min, {axis}max"),
                reason: e.to_string(),
            },
        }
    }
}

/// Errors surfaced by the session API.
#[derive(Debug, thiserror::Error)]
pub enum MifError {
    /// A block construction failed; the session has rolled back.
    #[error("in {class} <{name}>: {fault}")]
    Block {
        class: &'static str,
        name: String,
        fault: Fault,
    },

    /// The session had already failed when it was closed.
    #[error("{} could not be completed: {reason}", .path.display())]
    Aborted { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MifError {
    /// The construction fault behind this error, if any.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            MifError::Block { fault, .. } => Some(fault),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Axis;

    #[test]
    fn missing_fault_names_parameter() {
        let fault = Fault::missing("cellsize");
        assert!(matches!(&fault, Fault::Configuration { parameter, .. } if parameter == "cellsize"));
        let msg = format!("{fault}");
        assert!(msg.contains("cellsize"), "got: {msg}");
        assert!(msg.contains("mandatory"), "got: {msg}");
    }

    #[test]
    fn undefined_reference_lists_alternatives() {
        let fault = Fault::UndefinedReference {
            parameter: "Ms".to_string(),
            value: "Brick".to_string(),
            expected_kind: "scalar field".to_string(),
            valid: vec!["Ms1".to_string(), "Ms2".to_string()],
        };
        let msg = format!("{fault}");
        assert!(msg.contains("'Brick'"), "got: {msg}");
        assert!(msg.contains("scalar field"), "got: {msg}");
        assert!(msg.contains("[Ms1, Ms2]"), "got: {msg}");
        assert_eq!(fault.parameter(), "Ms");
    }

    #[test]
    fn geometry_error_becomes_validation_fault() {
        let fault: Fault = GeometryError::Reversed {
            axis: Axis::Y,
            min: 2.0,
            max: 1.0,
        }
        .into();
        match fault {
            Fault::Validation { parameter, reason } => {
                assert_eq!(parameter, "ymin, ymax");
                assert!(reason.contains("greater than"), "got: {reason}");
            }
            other => panic!("expected Validation, got: {other:?}"),
        }
    }

    #[test]
    fn block_error_display_includes_location() {
        let e = MifError::Block {
            class: "Oxs_RectangularMesh",
            name: "mesh".to_string(),
            fault: Fault::validation("xstep", "does not divide"),
        };
        let msg = format!("{e}");
        assert!(msg.contains("Oxs_RectangularMesh <mesh>"), "got: {msg}");
        assert!(msg.contains("xstep invalid"), "got: {msg}");
        assert!(e.fault().is_some());
    }

    #[test]
    fn io_error_is_transparent() {
        let e = MifError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(format!("{e}"), "gone");
        assert!(e.fault().is_none());
    }
}
