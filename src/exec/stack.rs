use super::*;

/// One entry of the execution stack: the routine (including its resume
/// point and scratch), the operator it works on, and its coordinate.
///
/// The coordinate is the routine's input until it delegates; when the child
/// completes, the child's coordinate is copied in, and the routine resumes
/// from there.
#[derive(Debug)]
pub(crate) struct Frame<'a> {
    pub routine: Routine,
    pub op: &'a Op,
    pub coord: Coor4D,
}

/// The outcome of resuming a routine
pub(crate) enum Resume<'a> {
    /// Suspend, and run this child frame
    Call(Frame<'a>),
    /// Complete: pop, and hand the coordinate to the parent
    Done,
    /// Abort the entire call
    Fail,
}

impl<'a> Frame<'a> {
    pub fn new(routine: Routine, op: &'a Op, coord: Coor4D) -> Frame<'a> {
        Frame { routine, op, coord }
    }

    /// A dimension driver frame, not taking inversion into account
    pub fn driver(op: &'a Op, direction: Direction, dim: Dim, coord: Coor4D) -> Frame<'a> {
        let routine = Routine::Driver {
            direction,
            dim,
            at: DriverAt::Start,
            last_errno: None,
        };
        Frame::new(routine, op, coord)
    }

    /// A dimension driver frame, flipping the direction for inverted operators
    pub fn trans(op: &'a Op, direction: Direction, dim: Dim, coord: Coor4D) -> Frame<'a> {
        let direction = if op.descriptor.inverted {
            direction.opposite()
        } else {
            direction
        };
        Frame::driver(op, direction, dim, coord)
    }
}

struct Stack<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> Stack<'a> {
    fn new() -> Stack<'a> {
        Stack {
            frames: Vec::with_capacity(STACK_CAPACITY),
        }
    }

    /// Overflow discards everything, and reports through the error code
    fn push(&mut self, frame: Frame<'a>, ws: &mut Workspace) -> bool {
        if self.frames.len() == STACK_CAPACITY {
            warn!("Execution stack capacity ({STACK_CAPACITY}) exceeded");
            self.frames.clear();
            ws.set_errno(Errno::Capacity);
            return false;
        }
        trace!("push {:?} ({})", frame.routine, self.frames.len() + 1);
        self.frames.push(frame);
        true
    }
}

/// Push `root`, and resume the top frame until the stack is empty.
/// Returns the coordinate of the root frame, or the error coordinate
/// if the stack was cleared by a failure or an overflow.
pub(crate) fn run<'a>(root: Frame<'a>, ws: &mut Workspace) -> Coor4D {
    let mut stack = Stack::new();
    let mut result = Coor4D::error();
    stack.push(root, ws);

    while let Some(top) = stack.frames.last_mut() {
        match resume(top, ws) {
            Resume::Call(child) => {
                if !stack.push(child, ws) {
                    break;
                }
            }
            Resume::Done => {
                let Some(done) = stack.frames.pop() else {
                    break;
                };
                trace!("pop {:?}", done.routine);
                match stack.frames.last_mut() {
                    Some(parent) => parent.coord = done.coord,
                    None => result = done.coord,
                }
            }
            Resume::Fail => {
                trace!("fail at depth {}", stack.frames.len());
                stack.frames.clear();
                result = Coor4D::error();
            }
        }
    }

    // Value stacks of pipelines aborted mid-way
    ws.stacks.clear();
    result
}

fn resume<'a>(frame: &mut Frame<'a>, ws: &mut Workspace) -> Resume<'a> {
    match frame.routine {
        Routine::FwdPrepare(at) => stages::fwd_prepare(frame, at, ws),
        Routine::FwdFinalize(at) => stages::fwd_finalize(frame, at, ws),
        Routine::InvPrepare(at) => stages::inv_prepare(frame, at, ws),
        Routine::InvFinalize(at) => stages::inv_finalize(frame, at, ws),
        Routine::Driver {
            direction,
            dim,
            at,
            last_errno,
        } => driver::resume(frame, direction, dim, at, last_errno, ws),
        Routine::Pipeline { direction, dim, at } => {
            crate::inner_op::pipeline::resume(frame, direction, dim, at, ws)
        }
    }
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // A pipeline nested n levels deep, with a single addone step at the bottom
    fn nested(levels: usize, ctx: &Minimal) -> Result<Op, Error> {
        let mut op = Op::new("proj=addone", ctx)?;
        for _ in 0..levels {
            op = Op::chain(vec![op], ctx)?;
        }
        Ok(op)
    }

    #[test]
    fn capacity() -> Result<(), Error> {
        let ctx = Minimal::default();
        let c = Coor4D::raw(1., 2., 3., 4.);

        // Each level of nesting takes two frames: a driver and a pipeline
        // coroutine. The step at the bottom takes two more: its driver and
        // its prepare stage. 2·7 + 2 = 16 frames fit...
        let op = nested(7, &ctx)?;
        let mut ws = Workspace::new(None);
        assert_eq!(trans(&op, Fwd, c, &mut ws), Coor4D::raw(2., 2., 3., 4.));
        assert_eq!(ws.errno(), None);

        // ...while 2·8 + 2 = 18 do not
        let op = nested(8, &ctx)?;
        let mut ws = Workspace::new(None);
        assert!(trans(&op, Fwd, c, &mut ws).is_error());
        assert_eq!(ws.errno(), Some(Errno::Capacity));

        // And no stale value stacks survive
        assert!(ws.stacks.is_empty());
        Ok(())
    }
}
