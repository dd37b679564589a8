//! Stash and retrieve coordinate elements on the value stacks of the
//! pipeline currently running.
//!
//! Each of the four coordinate elements has its own stack, so the order
//! in which the `v_n` flags are given is insignificant. Outside of a
//! pipeline, `push` and `pop` are both no-ops.
use crate::authoring::*;

const ELEMENTS: [&str; 4] = ["v_1", "v_2", "v_3", "v_4"];

// ----- K E R N E L S -----------------------------------------------------------------

pub(crate) fn push(op: &Op, ws: &mut Workspace, coord: Coor4D) -> Coor4D {
    if let Some(stacks) = ws.stacks.last_mut() {
        for (i, key) in ELEMENTS.iter().enumerate() {
            if op.params.boolean(key) {
                stacks.push(i, coord[i]);
            }
        }
    }
    coord
}

pub(crate) fn pop(op: &Op, ws: &mut Workspace, coord: Coor4D) -> Coor4D {
    let mut coord = coord;
    if let Some(stacks) = ws.stacks.last_mut() {
        for (i, key) in ELEMENTS.iter().enumerate() {
            if !op.params.boolean(key) {
                continue;
            }
            // Popping an empty stack leaves the element untouched
            if let Some(value) = stacks.pop(i) {
                coord[i] = value;
            }
        }
    }
    coord
}

// ----- C O N S T R U C T O R S -------------------------------------------------------

#[rustfmt::skip]
pub const GAMUT: [OpParameter; 4] = [
    OpParameter::Flag { key: "v_1" },
    OpParameter::Flag { key: "v_2" },
    OpParameter::Flag { key: "v_3" },
    OpParameter::Flag { key: "v_4" },
];

// A push is inverted by a pop, and vice versa
pub fn push_new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Whatever, IoUnits::Whatever);
    descriptor.fwd4d = OperatorId::Push;
    descriptor.inv4d = OperatorId::Pop;
    Op::plain(parameters, descriptor, &GAMUT, ctx)
}

pub fn pop_new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Whatever, IoUnits::Whatever);
    descriptor.fwd4d = OperatorId::Pop;
    descriptor.inv4d = OperatorId::Push;
    Op::plain(parameters, descriptor, &GAMUT, ctx)
}

// ----- T E S T S ---------------------------------------------------------------------
