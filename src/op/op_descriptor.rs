use super::*;

/// The fundamental elements of an operator (i.e. everything but parameters,
/// steps, and auxiliary sub-operations): its unit kinds, its inversion
/// state, and the dispatch ids of its kernels and coroutines.
///
/// Kernels and coroutines are represented by plain enum ids, resolved by
/// the [dispatcher](crate::dispatch) at execution time. An id left at its
/// `Invalid` default means "not implemented".
#[derive(Debug, Default, Clone)]
pub struct OpDescriptor {
    pub invoked_as: String,      // e.g. init=nkg:etrs89 inv
    pub instantiated_as: String, // e.g. proj=pipeline step proj=cart ...
    pub inverted: bool,
    pub left: IoUnits,
    pub right: IoUnits,

    pub fwd: Fwd2dId,
    pub inv: Inv2dId,
    pub fwd3d: Fwd3dId,
    pub inv3d: Inv3dId,
    pub fwd4d: OperatorId,
    pub inv4d: OperatorId,

    pub co_fwd: CoroutineId,
    pub co_inv: CoroutineId,
    pub co_fwd3d: CoroutineId,
    pub co_inv3d: CoroutineId,
    pub co_fwd4d: CoroutineId,
    pub co_inv4d: CoroutineId,

    pub skip_fwd_prepare: bool,
    pub skip_fwd_finalize: bool,
    pub skip_inv_prepare: bool,
    pub skip_inv_finalize: bool,
}

impl OpDescriptor {
    pub fn new(left: IoUnits, right: IoUnits) -> OpDescriptor {
        OpDescriptor {
            left,
            right,
            ..Default::default()
        }
    }

    /// Any forward implementation, in any dimensionality
    pub fn has_forward(&self) -> bool {
        self.fwd.is_valid()
            || self.fwd3d.is_valid()
            || self.fwd4d.is_valid()
            || self.co_fwd.is_valid()
            || self.co_fwd3d.is_valid()
            || self.co_fwd4d.is_valid()
    }

    /// Any inverse implementation, in any dimensionality
    pub fn has_inverse_slot(&self) -> bool {
        self.inv.is_valid()
            || self.inv3d.is_valid()
            || self.inv4d.is_valid()
            || self.co_inv.is_valid()
            || self.co_inv3d.is_valid()
            || self.co_inv4d.is_valid()
    }

    /// Can the operator run in the inverse direction, taking inversion into account?
    pub fn has_inverse(&self) -> bool {
        (self.inverted && self.has_forward()) || self.has_inverse_slot()
    }

    /// Can the operator run in the forward direction, taking inversion into
    /// account? Note the 4D slot: an inverted operator accepts a forward 4D
    /// kernel as its forward path.
    pub fn has_forward_path(&self) -> bool {
        if self.inverted {
            return self.inv.is_valid()
                || self.inv3d.is_valid()
                || self.fwd4d.is_valid()
                || self.co_inv.is_valid()
                || self.co_inv3d.is_valid()
                || self.co_fwd4d.is_valid();
        }
        self.has_forward()
    }

    /// Disable all inverse implementations
    pub fn clear_inverse(&mut self) {
        self.inv = Inv2dId::Invalid;
        self.inv3d = Inv3dId::Invalid;
        self.inv4d = OperatorId::Invalid;
        self.co_inv = CoroutineId::Invalid;
        self.co_inv3d = CoroutineId::Invalid;
        self.co_inv4d = CoroutineId::Invalid;
    }

    /// Let the operator be a raw bit mover, with no prepare/finalize stages
    pub fn skip_all(&mut self) {
        self.skip_fwd_prepare = true;
        self.skip_fwd_finalize = true;
        self.skip_inv_prepare = true;
        self.skip_inv_finalize = true;
    }

    /// The unit kind expected on input, taking inversion into account.
    /// Classic units are reported as projected.
    pub fn pj_left(&self) -> IoUnits {
        let units = if self.inverted { self.right } else { self.left };
        units.unclassic()
    }

    /// The unit kind delivered on output, taking inversion into account
    pub fn pj_right(&self) -> IoUnits {
        let units = if self.inverted { self.left } else { self.right };
        units.unclassic()
    }
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities() {
        let mut desc = OpDescriptor::new(IoUnits::Radians, IoUnits::Classic);
        assert!(!desc.has_forward());
        assert!(!desc.has_inverse());

        desc.fwd = Fwd2dId::Merc;
        assert!(desc.has_forward());
        assert!(desc.has_forward_path());
        assert!(!desc.has_inverse());

        // An inverted forward-only operator runs forward in its inverse direction
        desc.inverted = true;
        assert!(desc.has_inverse());
        assert!(!desc.has_forward_path());
        assert_eq!(desc.pj_left(), IoUnits::Projected);
        assert_eq!(desc.pj_right(), IoUnits::Radians);

        desc.inverted = false;
        desc.inv = Inv2dId::Merc;
        desc.co_inv4d = CoroutineId::PipelineInv4d;
        assert!(desc.has_inverse());
        desc.clear_inverse();
        assert!(!desc.has_inverse_slot());
        assert!(desc.has_forward());
    }
}
