//! Composable middleware components for building batch-processing pipelines.
//!
//! A [`Pipeline`] drives batches from a data loader through a chain of
//! [`Middleware`] components wrapped around a final [`Sink`]. Every middleware
//! receives the state shared across the whole run and the data of the current
//! batch, and passes the control on to the rest of the chain via [`Next`].
//!
//! ```
//! use middl::{Interrupt, Middleware, Next, Pipeline, StepResult};
//! use std::collections::BTreeMap;
//!
//! type State = BTreeMap<String, usize>;
//! type Data = BTreeMap<String, usize>;
//!
//! struct SkipOdd;
//!
//! impl Middleware<State, Data> for SkipOdd {
//!     fn step(
//!         &mut self,
//!         state: &mut State,
//!         data: &mut Data,
//!         next: Next<'_, State, Data>,
//!     ) -> StepResult {
//!         if state["step"] % 2 == 1 {
//!             return Err(Interrupt::Skip);
//!         }
//!         next.run(state, data)
//!     }
//! }
//!
//! let sink = |state: &mut State, data: &mut Data| -> StepResult {
//!     *state.entry("sum".to_owned()).or_default() += data["x"];
//!     Ok(())
//! };
//!
//! let mut pipeline = Pipeline::new(sink).middleware(SkipOdd);
//! let mut state = State::new();
//! let batches = (1..=4).map(|x| Data::from([("x".to_owned(), x)]));
//!
//! let report = pipeline.run(&mut state, batches).unwrap();
//!
//! assert_eq!(state["sum"], 1 + 3);
//! assert_eq!(report.skipped, 2);
//! ```

mod error;
mod fields;
mod loader;
mod middleware;
mod pipeline;

pub use error::*;
pub use fields::*;
pub use loader::*;
pub use middleware::*;
pub use pipeline::*;

pub(crate) type DynError = dyn std::error::Error + Send + Sync;
