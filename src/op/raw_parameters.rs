use super::*;

/// Interface between the operator factory, [`Op::op()`](crate::op::Op::op),
/// and the constructors of the individual operators.
///
/// `RawParameters` ferries the definition text, the context globals, and
/// the nesting bookkeeping from the invocation into the constructors, which
/// typically interpret it into a runtime friendly set of
/// [`ParsedParameters`](crate::op::ParsedParameters).
#[derive(Debug, Default, Clone)]
pub struct RawParameters {
    /// The definition as originally given by the user
    pub invocation: String,
    /// The definition at the current level of resource expansion
    pub definition: String,
    pub globals: BTreeMap<String, String>,
    /// Number of resource expansions and pipeline steps above this level
    pub recursion_level: usize,
    /// Number of pipelines enclosing this level
    pub pipeline_depth: usize,
}

/// Pipelines nested (through `init=` resources) this deep are rejected
pub const MAX_PIPELINE_DEPTH: usize = 5;
const MAX_RECURSION: usize = 100;

impl RawParameters {
    pub fn new(invocation: &str, globals: &BTreeMap<String, String>) -> RawParameters {
        let invocation = invocation.normalize();
        RawParameters {
            definition: invocation.clone(),
            invocation,
            globals: globals.clone(),
            recursion_level: 0,
            pipeline_depth: 0,
        }
    }

    /// Parameters for the expansion of a resource, at the same pipeline level
    pub fn next(&self, definition: &str) -> RawParameters {
        RawParameters {
            invocation: self.invocation.clone(),
            definition: definition.normalize(),
            globals: self.globals.clone(),
            recursion_level: self.recursion_level + 1,
            pipeline_depth: self.pipeline_depth,
        }
    }

    /// Parameters for a step of the pipeline currently being built
    pub fn step(&self, definition: &str) -> RawParameters {
        RawParameters {
            pipeline_depth: self.pipeline_depth + 1,
            ..self.next(definition)
        }
    }

    pub fn nesting_too_deep(&self) -> bool {
        self.recursion_level > MAX_RECURSION
    }

    pub fn pipeline_too_deep(&self) -> bool {
        self.pipeline_depth >= MAX_PIPELINE_DEPTH
    }
}

// ----- T E S T S ---------------------------------------------------------------------
