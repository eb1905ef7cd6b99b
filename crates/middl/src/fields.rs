use easy_ext::ext;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// A string-keyed record whose field names can be inspected.
///
/// Both the pipeline state and the batches produced by the data loader
/// implement this trait so that the pipeline can check that every field
/// required by its middlewares is present before processing starts.
pub trait Fields {
    fn field_names(&self) -> BTreeSet<String>;
}

/// The shared state of a pipeline run. The pipeline stores the index of the
/// current step in it under a configurable key.
pub trait StepState: Fields {
    fn set_step(&mut self, key: &str, step: usize);
}

impl<V, H: BuildHasher> Fields for HashMap<String, V, H> {
    fn field_names(&self) -> BTreeSet<String> {
        self.keys().cloned().collect()
    }
}

impl<V: From<usize>, H: BuildHasher> StepState for HashMap<String, V, H> {
    fn set_step(&mut self, key: &str, step: usize) {
        self.insert(key.to_owned(), step.into());
    }
}

impl<V> Fields for BTreeMap<String, V> {
    fn field_names(&self) -> BTreeSet<String> {
        self.keys().cloned().collect()
    }
}

impl<V: From<usize>> StepState for BTreeMap<String, V> {
    fn set_step(&mut self, key: &str, step: usize) {
        self.insert(key.to_owned(), step.into());
    }
}

impl Fields for serde_json::Map<String, serde_json::Value> {
    fn field_names(&self) -> BTreeSet<String> {
        self.keys().cloned().collect()
    }
}

impl StepState for serde_json::Map<String, serde_json::Value> {
    fn set_step(&mut self, key: &str, step: usize) {
        self.insert(key.to_owned(), step.into());
    }
}

/// Which half of a middleware is being checked. `Pre` is the work done on the
/// way toward the sink, `Post` is the work done on the way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pre,
    Post,
}

/// The fields a middleware reads from and writes to the state and the data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiddlewareFields {
    pub requires_state: BTreeSet<String>,
    pub requires_data_pre: BTreeSet<String>,
    pub provides_data_pre: BTreeSet<String>,
    pub requires_data_post: BTreeSet<String>,
    pub provides_data_post: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    State,
    DataPre,
    DataPost,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::State => "state",
            FieldKind::DataPre => "data pre",
            FieldKind::DataPost => "data post",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing {kind} fields {missing:?}")]
pub struct MissingFields {
    pub kind: FieldKind,
    pub missing: BTreeSet<String>,
}

impl MiddlewareFields {
    pub fn requires_state<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        fields: I,
    ) -> Self {
        self.requires_state.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn requires_data_pre<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        fields: I,
    ) -> Self {
        self.requires_data_pre.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn provides_data_pre<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        fields: I,
    ) -> Self {
        self.provides_data_pre.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn requires_data_post<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        fields: I,
    ) -> Self {
        self.requires_data_post.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn provides_data_post<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        fields: I,
    ) -> Self {
        self.provides_data_post.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Checks the required fields of one phase against the fields available at
    /// that point of the chain. On success the fields provided in that phase are
    /// added to `data_fields`, so the next middleware sees them.
    pub fn check(
        &self,
        state_fields: &BTreeSet<String>,
        data_fields: &mut BTreeSet<String>,
        phase: Phase,
    ) -> Result<(), MissingFields> {
        if let Some(missing) = self.requires_state.missing_from(state_fields) {
            return Err(MissingFields {
                kind: FieldKind::State,
                missing,
            });
        }

        let (kind, requires, provides) = match phase {
            Phase::Pre => (
                FieldKind::DataPre,
                &self.requires_data_pre,
                &self.provides_data_pre,
            ),
            Phase::Post => (
                FieldKind::DataPost,
                &self.requires_data_post,
                &self.provides_data_post,
            ),
        };

        if let Some(missing) = requires.missing_from(data_fields) {
            return Err(MissingFields { kind, missing });
        }

        data_fields.extend(provides.iter().cloned());

        Ok(())
    }
}

#[ext(FieldSetExt)]
impl BTreeSet<String> {
    /// Returns the fields of `self` absent in `available`, or [`None`] if
    /// there are none.
    fn missing_from(&self, available: &BTreeSet<String>) -> Option<BTreeSet<String>> {
        let missing: BTreeSet<_> = self.difference(available).cloned().collect();
        (!missing.is_empty()).then_some(missing)
    }
}
