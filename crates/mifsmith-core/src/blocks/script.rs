//! Script procedures referenced by script-driven blocks.

use serde::Deserialize;

use super::{Specify, require_list};
use crate::draft::Draft;
use crate::error::Fault;
use crate::finalize::Warning;
use crate::registry::Entity;
use crate::session::Layout;

/// A procedure written as `proc <name> { args } { ... }`, outside any
/// `Specify` frame.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Proc {
    /// Formal argument names.
    pub args: Vec<String>,
    /// Body lines, written one level deep.
    pub lines: Vec<String>,
}

impl Specify for Proc {
    fn class(&self) -> &'static str {
        "Proc"
    }

    fn label(&self) -> &'static str {
        "Proc"
    }

    fn layout(&self) -> Layout {
        Layout::SCRIPT
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let lines = require_list("lines", &self.lines)?;
        if !lines.iter().any(|line| line.contains("return")) {
            return Err(Fault::validation("lines", "the script does not return anything"));
        }

        for arg in &self.args {
            if !lines.iter().any(|line| line.contains(arg.as_str())) {
                d.warn(Warning::UnreferencedScriptArg {
                    script: d.name().to_string(),
                    arg: arg.clone(),
                });
            }
        }

        d.raw(format!("proc {} {{ {} }} {{", d.name(), self.args.join(" ")));
        for line in lines {
            d.line(line);
        }
        d.raw("}");
        d.register(Entity::Script {
            args: self.args.clone(),
        });
        Ok(())
    }
}
