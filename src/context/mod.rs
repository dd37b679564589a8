use crate::authoring::*;
mod minimal;
#[cfg(feature = "with_plain")]
mod plain;
pub use minimal::Minimal;
#[cfg(feature = "with_plain")]
pub use plain::Plain;

// ----- T H E   C O N T E X T   T R A I T ---------------------------------------------

/// The `Context` trait defines the mode of communication between the
/// execution engine and its surroundings: operator instantiation, access
/// to resources (macro-like definitions), and the error code slot left
/// behind by the most recent transformation.
///
/// The error code survives from one call to `apply`/`trans` to the next:
/// a failing call sets it, a successful call leaves an earlier code in
/// place. Use `reset_errno` to clear it.
pub trait Context {
    /// In general, implementations should make sure that `new` differs from
    /// `default` only by adding access to standard resources
    fn new() -> Self
    where
        Self: Sized;

    /// Instantiate the operation given by `definition`
    fn op(&mut self, definition: &str) -> Result<OpHandle, Error>;

    /// Apply operation `op` to `operands`, returning the number of
    /// successfully transformed coordinates
    fn apply(
        &self,
        op: OpHandle,
        direction: Direction,
        operands: &mut dyn CoordinateSet,
    ) -> Result<usize, Error>;

    /// Transform a single coordinate
    fn trans(&self, op: OpHandle, direction: Direction, coord: Coor4D) -> Result<Coor4D, Error>;

    /// The error code left behind by earlier transformations
    fn errno(&self) -> Option<Errno>;

    /// Clear the error code, returning its former value
    fn reset_errno(&self) -> Option<Errno>;

    /// Globally defined default values (typically just `ellps=GRS80`)
    fn globals(&self) -> BTreeMap<String, String>;

    /// Definitions of the steps of a pipeline (or the operator itself, if
    /// not a pipeline)
    fn steps(&self, op: OpHandle) -> Result<Vec<String>, Error>;

    /// The parameters of step `index`, or of the operator as a whole (`None`)
    fn params(&self, op: OpHandle, index: Option<usize>) -> Result<&ParsedParameters, Error>;

    /// The descriptor of step `index`, or of the operator as a whole (`None`)
    fn descriptor(&self, op: OpHandle, index: Option<usize>) -> Result<&OpDescriptor, Error>;

    /// Register a new user-defined operator
    fn register_op(&mut self, name: &str, constructor: OpConstructor);
    /// Register a new user-defined resource (macro, ellipsoid parameter set...)
    fn register_resource(&mut self, name: &str, definition: &str);

    /// Helper for the `Op` instantiation logic in `Op::op(...)`
    fn get_op(&self, name: &str) -> Result<OpConstructor, Error>;
    /// Helper for the `Op` instantiation logic in `Op::op(...)`
    fn get_resource(&self, name: &str) -> Result<String, Error>;
}

// ----- H E L P E R S   F O R   C O N T E X T   P R O V I D E R S ---------------------

/// Run `op` over `operands` in a fresh workspace, seeded with the error
/// code kept in `errno`, and store the resulting error code back there.
pub fn apply_with_errno(
    op: &Op,
    direction: Direction,
    operands: &mut dyn CoordinateSet,
    errno: &std::cell::Cell<Option<Errno>>,
) -> usize {
    let mut ws = Workspace::new(errno.get());
    let successes = op.apply(&mut ws, operands, direction);
    errno.set(ws.errno());
    successes
}

/// Single coordinate version of [`apply_with_errno`]
pub fn trans_with_errno(
    op: &Op,
    direction: Direction,
    coord: Coor4D,
    errno: &std::cell::Cell<Option<Errno>>,
) -> Coor4D {
    let mut ws = Workspace::new(errno.get());
    let coord = crate::exec::trans(op, direction, coord, &mut ws);
    errno.set(ws.errno());
    coord
}

/// The definitions of the steps of `op`
pub fn step_definitions(op: &Op) -> Vec<String> {
    if op.steps.is_empty() {
        return vec![op.descriptor.instantiated_as.clone()];
    }
    op.steps
        .iter()
        .map(|step| step.op.descriptor.instantiated_as.clone())
        .collect()
}

/// Step `index` of `op`. Non-pipelines are their own single step
pub fn step_of(op: &Op, index: Option<usize>) -> Result<&Op, Error> {
    match index {
        None => Ok(op),
        Some(0) if op.steps.is_empty() => Ok(op),
        Some(i) => match op.steps.get(i) {
            Some(step) => Ok(&step.op),
            None => Err(Error::General("Bad step index")),
        },
    }
}
