//! Transactional writer owning one output file.
//!
//! A session is either open or failed. Each declaration validates a block
//! completely before anything touches the registry or the file; if the block
//! is rejected the partial output is deleted and the session stays failed, so
//! every later declaration is a silent no-op.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::blocks::Specify;
use crate::draft::Draft;
use crate::error::{Fault, MifError};
use crate::finalize::{Warning, finalize};
use crate::registry::Registry;

/// Where a session writes and what basename the simulator should use.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub target: PathBuf,
    pub basename: Option<String>,
}

impl SessionConfig {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            basename: None,
        }
    }

    pub fn basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = Some(basename.into());
        self
    }

    /// The explicit basename with `/` separators, or the target's file stem.
    pub fn resolved_basename(&self) -> String {
        match &self.basename {
            Some(b) => b.replace('\\', "/"),
            None => self
                .target
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Trailing separator written after a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// Line end plus two blank lines.
    Double,
    /// Line end only.
    Single,
    /// Nothing at all.
    None,
}

impl Padding {
    fn as_str(self) -> &'static str {
        match self {
            Padding::Double => "\n\n\n",
            Padding::Single => "\n",
            Padding::None => "",
        }
    }
}

/// How a block kind is framed in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Block takes a name in the shared namespace.
    pub named: bool,
    /// Body is wrapped in `Specify <class>:<name> { ... }`.
    pub framed: bool,
    pub padding: Padding,
}

impl Layout {
    pub const BLOCK: Layout = Layout {
        named: true,
        framed: true,
        padding: Padding::Double,
    };
    pub const SCRIPT: Layout = Layout {
        named: true,
        framed: false,
        padding: Padding::Double,
    };
    pub const DIRECTIVE: Layout = Layout {
        named: false,
        framed: false,
        padding: Padding::Single,
    };
}

/// How the name of a declared block is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Naming {
    /// Derived from the block label, suffixed until unique.
    Auto,
    Explicit(String),
}

/// Result of a clean close.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub path: PathBuf,
    pub warnings: Vec<Warning>,
}

/// Final state of a closed session.
#[derive(Debug, Clone, PartialEq)]
pub enum Closed {
    Completed(Report),
    Failed { reason: String },
}

#[derive(Debug)]
enum State {
    Open(File),
    Failed { reason: String },
}

#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    basename: String,
    registry: Registry,
    warnings: Vec<Warning>,
    state: State,
}

impl Session {
    /// Creates directories, truncates the target and writes the header.
    pub fn open(config: SessionConfig) -> Result<Self, MifError> {
        let basename = config.resolved_basename();
        let base_dir = parent_dir(&config.target);
        fs::create_dir_all(&base_dir)?;
        if let Some((dir, _)) = basename.rsplit_once('/') {
            let dir = Path::new(dir);
            if dir.is_absolute() {
                fs::create_dir_all(dir)?;
            } else {
                fs::create_dir_all(base_dir.join(dir))?;
            }
        }

        let mut file = File::create(&config.target)?;
        let stamp = chrono::Local::now().format("%H:%M:%S on %A %b %d %Y");
        write!(file, "# MIF 2.1\n# Generated by mifsmith at {stamp}\n\n")?;
        debug!(path = %config.target.display(), %basename, "session opened");

        Ok(Self {
            path: config.target,
            basename,
            registry: Registry::new(),
            warnings: Vec::new(),
            state: State::Open(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Warnings raised by committed blocks so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed { .. })
    }

    /// Declares a block under an auto-generated name.
    pub fn declare(&mut self, spec: &dyn Specify) -> Result<Option<String>, MifError> {
        self.write(spec, Naming::Auto, None)
    }

    /// Declares a block under `name`.
    pub fn declare_named(&mut self, name: &str, spec: &dyn Specify) -> Result<Option<String>, MifError> {
        self.write(spec, Naming::Explicit(name.to_string()), None)
    }

    /// Validates, registers and appends one block.
    ///
    /// Returns the block name for named layouts and `None` for directives.
    /// `padding` overrides the layout's default separator. On a failed
    /// session this does nothing and returns `Ok(None)`.
    pub fn write(
        &mut self,
        spec: &dyn Specify,
        naming: Naming,
        padding: Option<Padding>,
    ) -> Result<Option<String>, MifError> {
        if self.is_failed() {
            return Ok(None);
        }
        let class = spec.class();
        let layout = spec.layout();

        let name = if layout.named {
            match naming {
                Naming::Explicit(name) => name,
                Naming::Auto => self.registry.auto_name(spec.label()),
            }
        } else {
            String::new()
        };

        let drafted = {
            let mut draft = Draft::new(&self.registry, class, name.clone(), &self.basename);
            let reserved = if layout.named {
                self.registry.reserve(&name)
            } else {
                Ok(())
            };
            reserved
                .and_then(|()| spec.draft(&mut draft))
                .map(|()| draft.into_committed())
        };
        let committed = match drafted {
            Ok(committed) => committed,
            Err(fault) => {
                let shown = if layout.named { name } else { spec.label().to_string() };
                return Err(self.fail(class, shown, fault));
            }
        };

        self.registry.apply(&name, class, committed.effects);

        let mut text = if layout.framed {
            frame(class, &name, committed.lines)
        } else {
            committed.lines.join("\n")
        };
        text.push_str(padding.unwrap_or(layout.padding).as_str());

        if let Err(e) = self.append(&text) {
            return Err(self.rollback(MifError::Io(e)));
        }
        debug!(class, name = %name, "block written");

        for warning in committed.warnings {
            warn!("({}) {warning}", self.path.display());
            self.warnings.push(warning);
        }

        Ok(layout.named.then_some(name))
    }

    /// Closes the session, running the finalizer if nothing failed.
    pub fn close(self) -> Closed {
        match self.state {
            State::Failed { reason } => Closed::Failed { reason },
            State::Open(file) => {
                drop(file);
                let mut warnings = self.warnings;
                let found = finalize(&self.registry, &parent_dir(&self.path));
                for warning in &found {
                    warn!("({}) {warning}", self.path.display());
                }
                warnings.extend(found);
                Closed::Completed(Report {
                    path: self.path,
                    warnings,
                })
            }
        }
    }

    fn append(&mut self, text: &str) -> std::io::Result<()> {
        if let State::Open(file) = &mut self.state {
            file.write_all(text.as_bytes())?;
            file.flush()?;
        }
        Ok(())
    }

    fn fail(&mut self, class: &'static str, name: String, fault: Fault) -> MifError {
        self.rollback(MifError::Block { class, name, fault })
    }

    /// Closes the handle, deletes the partial file and marks the session
    /// failed. A failed delete is logged but never replaces `error`.
    fn rollback(&mut self, error: MifError) -> MifError {
        let reason = error.to_string();
        self.state = State::Failed {
            reason: reason.clone(),
        };
        if let Err(e) = fs::remove_file(&self.path) {
            error!(
                "({}) could not remove partial output: {e}",
                self.path.display()
            );
        }
        debug!(path = %self.path.display(), %reason, "session rolled back");
        error
    }
}

/// Opens a session, runs `build` against it and closes it.
///
/// Any failure is logged as a one-line summary and still returned. A session
/// that failed while `build` swallowed the error comes back as
/// [`MifError::Aborted`].
pub fn write_simulation<F>(config: SessionConfig, build: F) -> Result<Report, MifError>
where
    F: FnOnce(&mut Session) -> Result<(), MifError>,
{
    let target = config.target.clone();
    let mut session = match Session::open(config) {
        Ok(session) => session,
        Err(e) => {
            error!("({}) could not be completed: {e}", target.display());
            return Err(e);
        }
    };

    let built = build(&mut session);
    let closed = session.close();
    match (built, closed) {
        (Err(e), _) => {
            error!("({}) could not be completed: {e}", target.display());
            Err(e)
        }
        (Ok(()), Closed::Failed { reason }) => {
            let e = MifError::Aborted {
                path: target,
                reason,
            };
            error!("{e}");
            Err(e)
        }
        (Ok(()), Closed::Completed(report)) => {
            info!(
                "({}) written with {} warning(s)",
                report.path.display(),
                report.warnings.len()
            );
            Ok(report)
        }
    }
}

fn frame(class: &str, name: &str, body: Vec<String>) -> String {
    if body.is_empty() {
        return format!("Specify {class}:{name} {{}}");
    }
    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(format!("Specify {class}:{name} {{"));
    lines.extend(body);
    lines.push("}".to_string());
    lines.join("\n")
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
