use crate::fields::MiddlewareFields;
use crate::DynError;

/// The outcome of a single processing step.
pub type StepResult = Result<(), Interrupt>;

/// Reasons for a step not to run to completion.
#[derive(Debug)]
pub enum Interrupt {
    /// Drop the current batch and continue with the next one.
    Skip,

    /// Stop the run. This is a regular way to finish early, not an error.
    Abort,

    /// Stop the run and report the error to the caller of the pipeline.
    Failed(Box<DynError>),
}

impl<E> From<E> for Interrupt
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::Failed(Box::new(err))
    }
}

/// A component wrapped around the rest of the processing chain.
///
/// The work done before calling [`Next::run`] happens on the way toward the
/// sink ("pre"), and the work done after it returns happens on the way back
/// ("post"). The middlewares are thus executed in their declared order before
/// the sink and in reverse order after it.
///
/// ```
/// use middl::{Middleware, MiddlewareFields, Next, StepResult};
/// use serde_json::{Map, Value};
///
/// struct Doubler;
///
/// impl Middleware<Map<String, Value>, Map<String, Value>> for Doubler {
///     fn step(
///         &mut self,
///         state: &mut Map<String, Value>,
///         data: &mut Map<String, Value>,
///         next: Next<'_, Map<String, Value>, Map<String, Value>>,
///     ) -> StepResult {
///         let value = data["value"].as_i64().unwrap_or_default();
///         data.insert("doubled".to_owned(), (value * 2).into());
///         next.run(state, data)
///     }
///
///     fn fields(&self) -> MiddlewareFields {
///         MiddlewareFields::default()
///             .requires_data_pre(["value"])
///             .provides_data_pre(["doubled"])
///     }
/// }
/// ```
pub trait Middleware<S, D> {
    /// Processes a single batch. Implementations hand the control to the rest of
    /// the chain with [`Next::run`]. Not calling it means the rest of the chain
    /// is not run for this batch.
    fn step(&mut self, state: &mut S, data: &mut D, next: Next<'_, S, D>) -> StepResult {
        next.run(state, data)
    }

    /// Invoked once before the first batch is processed.
    fn on_start(&mut self, _state: &mut S) {}

    /// Invoked once after the last batch is processed, also when the run
    /// terminates prematurely.
    fn on_finish(&mut self, _state: &mut S) {}

    /// Fields this middleware requires and provides, used for validation.
    fn fields(&self) -> MiddlewareFields {
        MiddlewareFields::default()
    }

    /// Human-readable name used in validation errors and logs.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        let path = full.split('<').next().unwrap_or(full);
        path.rsplit("::").next().unwrap_or(path)
    }
}

/// The innermost processing step of a pipeline.
pub trait Sink<S, D> {
    fn process(&mut self, state: &mut S, data: &mut D) -> StepResult;
}

impl<S, D, F> Sink<S, D> for F
where
    F: FnMut(&mut S, &mut D) -> StepResult,
{
    fn process(&mut self, state: &mut S, data: &mut D) -> StepResult {
        self(state, data)
    }
}

/// A sink that doesn't do anything.
pub fn empty_sink<S, D>(_state: &mut S, _data: &mut D) -> StepResult {
    Ok(())
}

/// The rest of the processing chain after the current middleware.
pub struct Next<'a, S, D> {
    middlewares: &'a mut [Box<dyn Middleware<S, D>>],
    sink: &'a mut dyn Sink<S, D>,
}

impl<'a, S, D> Next<'a, S, D> {
    pub(crate) fn new(
        middlewares: &'a mut [Box<dyn Middleware<S, D>>],
        sink: &'a mut dyn Sink<S, D>,
    ) -> Self {
        Self { middlewares, sink }
    }

    /// Runs the next middleware in the chain, or the sink if no middlewares
    /// are left.
    pub fn run(self, state: &mut S, data: &mut D) -> StepResult {
        let Self { middlewares, sink } = self;

        match middlewares.split_first_mut() {
            Some((middleware, rest)) => middleware.step(state, data, Next::new(rest, sink)),
            None => sink.process(state, data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct Noop;

    impl Middleware<Vec<&'static str>, ()> for Noop {}

    struct Trace(&'static str);

    impl Middleware<Vec<&'static str>, ()> for Trace {
        fn step(
            &mut self,
            state: &mut Vec<&'static str>,
            data: &mut (),
            next: Next<'_, Vec<&'static str>, ()>,
        ) -> StepResult {
            state.push(self.0);
            let result = next.run(state, data);
            state.push(self.0);
            result
        }
    }

    #[test]
    fn default_name_strips_module_path() {
        assert_eq!(Noop.name(), "Noop");
        assert_eq!(Trace("a").name(), "Trace");
    }

    #[test]
    fn chain_runs_pre_in_order_and_post_in_reverse() {
        let mut middlewares: Vec<Box<dyn Middleware<Vec<&'static str>, ()>>> =
            vec![Box::new(Trace("a")), Box::new(Noop), Box::new(Trace("b"))];

        let mut sink = |state: &mut Vec<&'static str>, _: &mut ()| -> StepResult {
            state.push("sink");
            Ok(())
        };

        let mut state = vec![];
        Next::new(&mut middlewares, &mut sink)
            .run(&mut state, &mut ())
            .unwrap();

        assert_eq!(state, ["a", "b", "sink", "b", "a"]);
    }

    #[test]
    fn errors_convert_into_failed_interrupt() {
        fn parse(input: &str) -> StepResult {
            input.parse::<u32>()?;
            Ok(())
        }

        assert_matches!(parse("12"), Ok(()));
        assert_matches!(parse("twelve"), Err(Interrupt::Failed(err)) => {
            assert_eq!(err.to_string(), "invalid digit found in string");
        });
    }
}
