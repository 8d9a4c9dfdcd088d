//! Process one file: main rules, then the post-pass pipeline.

use std::path::Path;

use crate::ast::Program;
use crate::context::FileContext;
use crate::error::PassError;
use crate::resolver::ResolvedRule;
use crate::runner::PipelineRunner;
use crate::skip::SkipPolicy;

/// Outcome of processing one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
    pub program: Program,
    /// Main rules that were applied, in order.
    pub applied: Vec<&'static str>,
}

/// Runs resolved main rules over a program and hands the shared context to
/// the post-pass runner.
#[derive(Debug, Clone, Copy)]
pub struct FileProcessor<'a> {
    rules: &'a [ResolvedRule],
    runner: &'a PipelineRunner<'a>,
    skip: &'a SkipPolicy,
}

impl<'a> FileProcessor<'a> {
    pub fn new(
        rules: &'a [ResolvedRule],
        runner: &'a PipelineRunner<'a>,
        skip: &'a SkipPolicy,
    ) -> Self {
        Self {
            rules,
            runner,
            skip,
        }
    }

    pub fn process(&self, mut program: Program, file_path: &Path) -> Result<ProcessResult, PassError> {
        let mut ctx = FileContext::new(file_path);
        let mut applied = Vec::new();

        for rule in self.rules {
            let id = rule.id();
            if self.skip.should_skip(id, file_path) || self.skip.companion_skipped(id, file_path) {
                tracing::debug!(rule = id, file = %file_path.display(), "skipped by configuration");
                continue;
            }
            if !rule.should_traverse(&program, &ctx) {
                continue;
            }
            program = rule.apply(program, &mut ctx)?;
            applied.push(id);
        }

        let program = self.runner.run_with_context(program, &mut ctx)?;
        tracing::debug!(
            file = %file_path.display(),
            applied = applied.len(),
            "processed file"
        );
        Ok(ProcessResult { program, applied })
    }
}
