//! Runs the enabled post passes over one file's program.

use std::path::Path;

use crate::ast::Program;
use crate::context::FileContext;
use crate::error::PassError;
use crate::pipeline::PassPipeline;
use crate::skip::SkipPolicy;

/// Applies a [`PassPipeline`] to programs, honouring a [`SkipPolicy`].
///
/// For each enabled pass, in order, the pass is skipped when:
///
/// - its `should_traverse` pre-check is `false`,
/// - the policy skips the pass for the file, or
/// - the pass has a companion and the companion is skipped for the file.
///
/// Otherwise it is applied and its output feeds the next pass. Errors from
/// a pass are returned unchanged and abort the run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineRunner<'a> {
    pipeline: &'a PassPipeline,
    skip: &'a SkipPolicy,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(pipeline: &'a PassPipeline, skip: &'a SkipPolicy) -> Self {
        Self { pipeline, skip }
    }

    /// Run with a fresh context for `file_path`.
    pub fn run(&self, program: Program, file_path: &Path) -> Result<Program, PassError> {
        let mut ctx = FileContext::new(file_path);
        self.run_with_context(program, &mut ctx)
    }

    /// Run with a context already populated by main rules.
    pub fn run_with_context(
        &self,
        mut program: Program,
        ctx: &mut FileContext,
    ) -> Result<Program, PassError> {
        for pass in self.pipeline.enabled_passes() {
            let id = pass.id();
            if !pass.should_traverse(&program, ctx) {
                tracing::trace!(pass = id, "nothing to do");
                continue;
            }

            let file_path = ctx.file_path();
            if self.skip.should_skip(id, file_path) {
                tracing::debug!(pass = id, file = %file_path.display(), "skipped by configuration");
                continue;
            }
            if self.skip.companion_skipped(id, file_path) {
                tracing::debug!(
                    pass = id,
                    companion = self.skip.companion_of(id),
                    file = %file_path.display(),
                    "skipped with companion"
                );
                continue;
            }

            tracing::trace!(pass = id, "applying");
            program = pass.apply(program, ctx)?;
        }
        Ok(program)
    }
}
