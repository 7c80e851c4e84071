// orderflow/src/pipeline/execution.rs

//! `Pipeline::run()`: executes steps in order and unwinds compensators on failure.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, info_span, instrument, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// - A step whose `skip_if` returns `true` is not entered.
  /// - A non-optional step without any handler fails with `FlowError::HandlerMissing`.
  /// - `PipelineControl::Stop` ends the run with `PipelineResult::Stopped`; nothing is undone.
  /// - When a handler returns an error, the compensators of every entered step (the failing
  ///   one included) run in reverse order, then the original error is returned. Compensator
  ///   failures are logged and never replace the original error.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(pipeline = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");
    let mut entered: Vec<&str> = Vec::new();

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_cond_fn) = &step_def.skip_if {
        if skip_cond_fn(ctx_data.clone()) {
          event!(Level::INFO, step_name, "Step skipped due to 'skip_if' condition.");
          continue;
        }
      }

      let before = self.before.get(step_name).filter(|h| !h.is_empty());
      let on = self.on.get(step_name).filter(|h| !h.is_empty());
      let after = self.after.get(step_name).filter(|h| !h.is_empty());

      if before.is_none() && on.is_none() && after.is_none() {
        if step_def.optional {
          event!(Level::DEBUG, step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step_name, "Non-optional step has no handlers.");
        self.unwind(&entered, &ctx_data).await;
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      entered.push(step_name);
      let step_span = info_span!(
        "pipeline_step",
        step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      match self.run_step(before, on, after, &ctx_data).instrument(step_span).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          event!(Level::INFO, step_name, "Pipeline stopped by a handler.");
          return Ok(PipelineResult::Stopped);
        }
        Err(e) => {
          event!(Level::WARN, step_name, error = %e, "Step failed, unwinding entered steps.");
          self.unwind(&entered, &ctx_data).await;
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(
    &self,
    before: Option<&Vec<Handler<TData, Err>>>,
    on: Option<&Vec<Handler<TData, Err>>>,
    after: Option<&Vec<Handler<TData, Err>>>,
    ctx_data: &ContextData<TData>,
  ) -> Result<PipelineControl, Err> {
    for (phase, handlers) in [("before", before), ("on", on), ("after", after)] {
      let Some(handlers) = handlers else {
        continue;
      };
      for (handler_idx, handler_fn) in handlers.iter().enumerate() {
        event!(Level::TRACE, phase, handler_index = handler_idx, "Executing handler.");
        match handler_fn(ctx_data.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => return Ok(PipelineControl::Stop),
          Err(e) => {
            event!(Level::ERROR, phase, handler_index = handler_idx, error = %e, "Handler failed.");
            return Err(e);
          }
        }
      }
    }
    Ok(PipelineControl::Continue)
  }

  async fn unwind(&self, entered: &[&str], ctx_data: &ContextData<TData>) {
    for step_name in entered.iter().rev().copied() {
      let Some(compensators) = self.compensators.get(step_name) else {
        continue;
      };
      for compensator in compensators.iter().rev() {
        match compensator(ctx_data.clone()).await {
          Ok(()) => event!(Level::DEBUG, step_name, "Compensation applied."),
          Err(e) => event!(
            Level::WARN,
            step_name,
            error = %e,
            "Compensation failed, continuing to unwind."
          ),
        }
      }
    }
  }
}
