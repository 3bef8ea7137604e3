//! Application core: holds a kernel, a proportions table and a builder, and
//! runs the derive → build → export cycle.

use std::path::{Path, PathBuf};

use geom_kernel::KernelBundle;
use shaft_format::{ExportError, ShaftDesign};
use shaft_ops::{BuilderSettings, Diagnostics, OpError, ShaftBuilder};
use shaft_proportions::{ConfigError, ShaftProportions};
use tracing::{error, info, instrument, warn};

pub const EXIT_OK: i32 = 0;
pub const EXIT_BUILD_FAILED: i32 = 1;
/// Used by the command line front end when its inputs are rejected.
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_EXPORT_FAILED: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("shaft construction failed: {0}")]
    Build(#[from] OpError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Build(_) => EXIT_BUILD_FAILED,
            RunError::Export(_) => EXIT_EXPORT_FAILED,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub path: PathBuf,
    pub segments: usize,
    pub slots: usize,
    pub diagnostics: Diagnostics,
}

/// One shaft being edited and generated.
///
/// Setters validate before touching anything, so a rejected value leaves
/// the session exactly as it was and the next run uses the last valid
/// configuration.
pub struct ShaftSession<K: KernelBundle> {
    kernel: K,
    proportions: ShaftProportions,
    builder: ShaftBuilder,
}

impl<K: KernelBundle> ShaftSession<K> {
    pub fn new(kernel: K, proportions: ShaftProportions, settings: BuilderSettings) -> Self {
        Self {
            kernel,
            proportions,
            builder: ShaftBuilder::new(settings),
        }
    }

    pub fn from_design(kernel: K, design: &ShaftDesign) -> Result<Self, ConfigError> {
        Ok(Self {
            kernel,
            proportions: design.proportions()?,
            builder: design.builder(),
        })
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    pub fn proportions(&self) -> &ShaftProportions {
        &self.proportions
    }

    pub fn builder(&self) -> &ShaftBuilder {
        &self.builder
    }

    /// Current parameters as a saveable design.
    pub fn design(&self) -> ShaftDesign {
        ShaftDesign::from_proportions(&self.proportions, *self.builder.settings())
    }

    pub fn set_total_length(&mut self, length: f64) -> Result<(), ConfigError> {
        match self.proportions.set_total_length(length) {
            Ok(()) => {
                info!(length, "total shaft length set");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "rejected total length");
                Err(e)
            }
        }
    }

    pub fn set_segment_diameter(&mut self, index: usize, diameter: f64) -> Result<(), ConfigError> {
        match self.proportions.set_custom_diameter(index, diameter) {
            Ok(()) => {
                let name = self.proportions.segment_name(index)?;
                info!(index, name, diameter, "segment diameter set");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "rejected segment diameter");
                Err(e)
            }
        }
    }

    /// Derive, build and export to `path`.
    #[instrument(skip(self), fields(total_length = self.proportions.total_length()))]
    pub fn try_run(&mut self, path: &Path) -> Result<RunSummary, RunError> {
        info!("starting shaft construction");
        self.builder.derive_from_proportions(&self.proportions)?;
        self.builder.build(&mut self.kernel)?;
        shaft_format::export_step(&self.builder, &self.kernel, path)?;

        let diagnostics = self.builder.diagnostics().clone();
        if !diagnostics.is_clean() {
            warn!(?diagnostics, "shaft built with adjustments");
        }
        info!("shaft construction completed");
        Ok(RunSummary {
            path: path.to_path_buf(),
            segments: self.builder.segments().len(),
            slots: self.builder.slots().len(),
            diagnostics,
        })
    }

    /// Like [`try_run`](Self::try_run), reporting the outcome as a process exit code.
    pub fn run(&mut self, path: &Path) -> i32 {
        match self.try_run(path) {
            Ok(_) => EXIT_OK,
            Err(e) => {
                error!(error = %e, "shaft construction failed");
                e.exit_code()
            }
        }
    }
}
