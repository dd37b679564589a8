use crate::authoring::*;
use std::cell::Cell;

// ----- T H E   M I N I M A L   P R O V I D E R ---------------------------------------

/// A minimalistic context provider, supporting only built in and run-time defined
/// operators and resources. Usually sufficient for cartographic uses, and for
/// internal test authoring.
#[derive(Debug, Default)]
pub struct Minimal {
    /// Constructors for user defined operators
    constructors: BTreeMap<String, OpConstructor>,
    /// User defined resources (macros)
    resources: BTreeMap<String, String>,
    /// Instantiations of operators
    operators: BTreeMap<OpHandle, Op>,
    /// The error code of the most recent failing transformation
    errno: Cell<Option<Errno>>,
}

const BAD_ID_MESSAGE: Error = Error::General("Minimal: Unknown operator id");

impl Minimal {
    fn get(&self, op: OpHandle) -> Result<&Op, Error> {
        self.operators.get(&op).ok_or(BAD_ID_MESSAGE)
    }

    /// Take ownership of an operator instantiated elsewhere
    pub(crate) fn insert(&mut self, op: Op) -> OpHandle {
        let id = op.id;
        self.operators.insert(id, op);
        id
    }
}

impl Context for Minimal {
    fn new() -> Minimal {
        Minimal::default()
    }

    fn op(&mut self, definition: &str) -> Result<OpHandle, Error> {
        let op = Op::new(definition, self)?;
        Ok(self.insert(op))
    }

    fn apply(
        &self,
        op: OpHandle,
        direction: Direction,
        operands: &mut dyn CoordinateSet,
    ) -> Result<usize, Error> {
        let op = self.get(op)?;
        Ok(apply_with_errno(op, direction, operands, &self.errno))
    }

    fn trans(&self, op: OpHandle, direction: Direction, coord: Coor4D) -> Result<Coor4D, Error> {
        let op = self.get(op)?;
        Ok(trans_with_errno(op, direction, coord, &self.errno))
    }

    fn errno(&self) -> Option<Errno> {
        self.errno.get()
    }

    fn reset_errno(&self) -> Option<Errno> {
        self.errno.take()
    }

    fn globals(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("ellps".to_string(), "GRS80".to_string())])
    }

    fn steps(&self, op: OpHandle) -> Result<Vec<String>, Error> {
        Ok(step_definitions(self.get(op)?))
    }

    fn params(&self, op: OpHandle, index: Option<usize>) -> Result<&ParsedParameters, Error> {
        Ok(&step_of(self.get(op)?, index)?.params)
    }

    fn descriptor(&self, op: OpHandle, index: Option<usize>) -> Result<&OpDescriptor, Error> {
        Ok(&step_of(self.get(op)?, index)?.descriptor)
    }

    fn register_op(&mut self, name: &str, constructor: OpConstructor) {
        self.constructors.insert(String::from(name), constructor);
    }

    fn get_op(&self, name: &str) -> Result<OpConstructor, Error> {
        if let Some(result) = self.constructors.get(name) {
            return Ok(*result);
        }

        Err(Error::NotFound(
            name.to_string(),
            ": User defined constructor".to_string(),
        ))
    }

    fn register_resource(&mut self, name: &str, definition: &str) {
        self.resources
            .insert(String::from(name), String::from(definition));
    }

    fn get_resource(&self, name: &str) -> Result<String, Error> {
        if let Some(result) = self.resources.get(name) {
            return Ok(result.to_string());
        }

        Err(Error::NotFound(
            name.to_string(),
            ": User defined resource".to_string(),
        ))
    }
}

// ----- T E S T S ---------------------------------------------------------------------
