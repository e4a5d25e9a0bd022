//! Output directives: destinations and the schedules that feed them.
//!
//! Both are written as bare single-line directives after the blocks, take no
//! name in the shared namespace and never appear in the registry's entity
//! table. Destination labels live in their own namespace.

use serde::Deserialize;

use super::{Keyword, Specify, require};
use crate::draft::Draft;
use crate::error::Fault;
use crate::session::Layout;

/// Kind of sink an output is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DestinationType {
    #[serde(rename = "mmDisp")]
    MmDisp,
    #[serde(rename = "mmGraph")]
    MmGraph,
    #[serde(rename = "mmArchive")]
    MmArchive,
    #[serde(rename = "mmDataTable")]
    MmDataTable,
}

impl Keyword for DestinationType {
    fn as_str(&self) -> &'static str {
        match self {
            DestinationType::MmDisp => "mmDisp",
            DestinationType::MmGraph => "mmGraph",
            DestinationType::MmArchive => "mmArchive",
            DestinationType::MmDataTable => "mmDataTable",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Destination {
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<DestinationType>,
    /// Ask for a fresh instance of the sink rather than reusing one.
    pub new: bool,
}

impl Specify for Destination {
    fn class(&self) -> &'static str {
        "Destination"
    }

    fn layout(&self) -> Layout {
        Layout::DIRECTIVE
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let label = require("label", &self.label)?;
        let kind = require("type", &self.kind)?;
        d.add_destination(label)?;
        let suffix = if self.new { " new" } else { "" };
        d.raw(format!("Destination {label} {}{suffix}", kind.as_str()));
        Ok(())
    }
}

/// Sends an output quantity to a declared destination every `stage` stages
/// and/or every `step` steps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Schedule {
    /// Output quantity, e.g. `DataTable` or `Oxs_TimeDriver::Magnetization`.
    pub output: Option<String>,
    /// Destination label.
    pub label: Option<String>,
    pub stage: Option<u64>,
    pub step: Option<u64>,
}

impl Specify for Schedule {
    fn class(&self) -> &'static str {
        "Schedule"
    }

    fn layout(&self) -> Layout {
        Layout::DIRECTIVE
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let output = require("output", &self.output)?;
        let label = require("label", &self.label)?;
        d.destination("label", label)?;
        if self.stage.is_none() && self.step.is_none() {
            return Err(Fault::missing("stage or step"));
        }

        for (event, every) in [("Stage", self.stage), ("Step", self.step)] {
            let Some(every) = every else { continue };
            if every == 0 {
                return Err(Fault::validation(
                    &event.to_lowercase(),
                    "cadence must be at least 1",
                ));
            }
            d.raw(format!("Schedule {output} {label} {event} {every}"));
        }
        d.schedule();
        Ok(())
    }
}
