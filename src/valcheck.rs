use crate::{
    BalancedEncodedPoly, BalancedSlotsEncodedPoly, FractionalEncodedPoly,
    SparseMultiPoly, SparsePoly,
};

/// Provide methods for checking the validity of encoded objects.
pub trait ValCheck {
    /// Check whether the stored terms hold the nonzero-coefficient invariant.
    fn is_buffer_valid(&self) -> bool;
    /// Check whether the shape of the data is valid for its representation.
    fn is_data_valid(&self) -> bool;
    /// Check whether the object is valid.
    /// Shortcut for [ValCheck::is_buffer_valid] plus [ValCheck::is_data_valid].
    fn is_valid(&self) -> bool {
        self.is_buffer_valid() && self.is_data_valid()
    }
}

impl ValCheck for SparsePoly {

    fn is_buffer_valid(&self) -> bool {
        self.iter().all(|(_, v)| v != 0)
    }

    fn is_data_valid(&self) -> bool {
        true
    }

}

impl ValCheck for SparseMultiPoly {

    fn is_buffer_valid(&self) -> bool {
        self.slots().iter().all(|slot| slot.is_buffer_valid())
    }

    fn is_data_valid(&self) -> bool {
        true
    }

}

impl ValCheck for BalancedEncodedPoly {

    fn is_buffer_valid(&self) -> bool {
        self.poly().is_buffer_valid()
    }

    // The Laurent part must have been shifted out into the digit.
    fn is_data_valid(&self) -> bool {
        self.digit() <= 0 && !self.poly().is_laurent()
    }

}

impl ValCheck for BalancedSlotsEncodedPoly {

    fn is_buffer_valid(&self) -> bool {
        self.poly().is_buffer_valid()
    }

    fn is_data_valid(&self) -> bool {
        self.digits().len() == self.poly().slot_count()
            && self.digits().iter().all(|&digit| digit <= 0)
            && self.poly().slots().iter().all(|slot| !slot.is_laurent())
    }

}

impl ValCheck for FractionalEncodedPoly {

    fn is_buffer_valid(&self) -> bool {
        self.poly().is_buffer_valid()
    }

    // Folded exponents live inside the ring.
    fn is_data_valid(&self) -> bool {
        self.poly().iter().all(|(k, _)| k >= 0 && k < self.frac_degree())
    }

}
