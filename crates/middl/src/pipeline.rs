use crate::error::{Error, Result, ValidationError};
use crate::fields::{Fields, Phase, StepState};
use crate::loader::Loader;
use crate::middleware::{Interrupt, Middleware, Next, Sink};
use std::collections::BTreeSet;
use std::convert::Infallible;
use tracing::{debug, debug_span, trace};

const DEFAULT_STEP_KEY: &str = "step";

/// Runs batches from a data loader sequentially through a chain of
/// middlewares wrapped around a sink.
pub struct Pipeline<S, D> {
    middlewares: Vec<Box<dyn Middleware<S, D>>>,
    sink: Box<dyn Sink<S, D>>,
    step_key: String,
    validate_first_batch: bool,
}

/// Summary of a finished pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Number of steps that went through the whole chain.
    pub completed: usize,

    /// Number of steps interrupted with [`Interrupt::Skip`].
    pub skipped: usize,

    /// The step at which the run was interrupted with [`Interrupt::Abort`].
    pub aborted_at: Option<usize>,
}

impl<S, D> Pipeline<S, D>
where
    S: StepState,
    D: Fields,
{
    pub fn new(sink: impl Sink<S, D> + 'static) -> Self {
        Self {
            middlewares: vec![],
            sink: Box::new(sink),
            step_key: DEFAULT_STEP_KEY.to_owned(),
            validate_first_batch: true,
        }
    }

    /// Appends a middleware to the end of the chain (closest to the sink).
    pub fn middleware(mut self, middleware: impl Middleware<S, D> + 'static) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    /// Appends already boxed middlewares to the end of the chain.
    pub fn middlewares(
        mut self,
        middlewares: impl IntoIterator<Item = Box<dyn Middleware<S, D>>>,
    ) -> Self {
        self.middlewares.extend(middlewares);
        self
    }

    /// The key under which the index of the current step is stored in the
    /// state. Defaults to `"step"`.
    pub fn step_key(mut self, key: impl Into<String>) -> Self {
        self.step_key = key.into();
        self
    }

    /// Whether to [`validate`](Self::validate) the fields of the state and the
    /// first batch before processing it. Enabled by default.
    pub fn validate_first_batch(mut self, validate: bool) -> Self {
        self.validate_first_batch = validate;
        self
    }

    /// Checks that the state and the batches contain all the fields required
    /// by the middlewares, following the flow of the data through the chain.
    ///
    /// The forward pass (toward the sink) checks the required state fields and
    /// the pre-processing data fields of each middleware in order, accumulating
    /// the data fields they provide. The reverse pass (away from the sink) does
    /// the same for the post-processing data fields in reverse order.
    pub fn validate(
        &self,
        state_fields: &BTreeSet<String>,
        data_fields: &BTreeSet<String>,
    ) -> Result<(), ValidationError> {
        let mut data_fields = data_fields.clone();

        let forward = self.middlewares.iter().enumerate().map(|e| (e, Phase::Pre));
        let backward = self
            .middlewares
            .iter()
            .enumerate()
            .rev()
            .map(|e| (e, Phase::Post));

        for ((index, middleware), phase) in forward.chain(backward) {
            middleware
                .fields()
                .check(state_fields, &mut data_fields, phase)
                .map_err(|missing| ValidationError {
                    middleware: middleware.name().to_owned(),
                    index,
                    missing,
                })?;
        }

        Ok(())
    }

    /// Validates the pipeline against the data fields declared by the loader.
    /// The step key is considered present in the state.
    pub fn validate_loader<L: Loader>(
        &self,
        state: &S,
        loader: &L,
    ) -> Result<(), ValidationError> {
        let mut state_fields = state.field_names();
        state_fields.insert(self.step_key.clone());

        self.validate(&state_fields, loader.data_fields())
    }

    /// Processes all batches from the loader through the chain.
    ///
    /// On every step the index of the step is recorded in the state under the
    /// [step key](Self::step_key). The middlewares' `on_start` hooks run
    /// before the first batch and their `on_finish` hooks run after the last
    /// one, even if the run terminates early.
    pub fn run<L>(&mut self, state: &mut S, loader: L) -> Result<RunReport>
    where
        L: IntoIterator<Item = D>,
    {
        self.try_run(state, loader.into_iter().map(Ok::<_, Infallible>))
    }

    /// Same as [`run`](Self::run), but for loaders that may fail to produce a
    /// batch. A loader error terminates the run.
    pub fn try_run<L, E>(&mut self, state: &mut S, loader: L) -> Result<RunReport>
    where
        L: IntoIterator<Item = std::result::Result<D, E>>,
        E: Into<Box<crate::DynError>>,
    {
        let span = debug_span!("pipeline_run", middlewares = self.middlewares.len());
        let _guard = span.enter();

        for middleware in &mut self.middlewares {
            middleware.on_start(state);
        }

        let result = self.run_steps(state, loader);

        for middleware in &mut self.middlewares {
            middleware.on_finish(state);
        }

        match &result {
            Ok(report) => debug!(?report, "Pipeline run finished"),
            Err(err) => debug!(%err, "Pipeline run failed"),
        }

        result
    }

    fn run_steps<L, E>(&mut self, state: &mut S, loader: L) -> Result<RunReport>
    where
        L: IntoIterator<Item = std::result::Result<D, E>>,
        E: Into<Box<crate::DynError>>,
    {
        let mut report = RunReport::default();

        for (step, batch) in loader.into_iter().enumerate() {
            let mut data = batch.map_err(|source| Error::Load {
                step,
                source: source.into(),
            })?;

            state.set_step(&self.step_key, step);

            if step == 0 && self.validate_first_batch {
                self.validate(&state.field_names(), &data.field_names())?;
            }

            let next = Next::new(&mut self.middlewares, &mut *self.sink);

            match next.run(state, &mut data) {
                Ok(()) => report.completed += 1,
                Err(Interrupt::Skip) => {
                    trace!(step, "Skipping step");
                    report.skipped += 1;
                }
                Err(Interrupt::Abort) => {
                    debug!(step, "Aborting pipeline");
                    report.aborted_at = Some(step);
                    break;
                }
                Err(Interrupt::Failed(source)) => return Err(Error::Step { step, source }),
            }
        }

        Ok(report)
    }
}
