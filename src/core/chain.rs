//! An ordered sequence of [`Transform`]s applied (or reversed) as a unit.

use crate::core::transform::Transform;
use crate::error::OverflowError;

/// `apply_chain(x) = f_n(... f_1(x) ...)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Chain {
    transforms: Vec<Transform>,
}

impl Chain {
    pub fn new(transforms: Vec<Transform>) -> Self {
        Chain { transforms }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Sequential application; the first `Overflow` encountered short-circuits.
    pub fn apply(&self, x: u64) -> Result<u64, OverflowError> {
        self.transforms.iter().try_fold(x, |acc, t| t.apply(acc))
    }

    /// `reverse_chain = [invert(f_n), ..., invert(f_1)]`.
    pub fn invert(&self) -> Chain {
        Chain {
            transforms: self.transforms.iter().rev().map(Transform::invert).collect(),
        }
    }

    /// Cheap scan used by back-ends to decide whether a scratch temporary
    /// for `Perm`'s XOR-swap needs declaring.
    pub fn contains_perm(&self) -> bool {
        self.transforms.iter().any(Transform::is_perm)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transform> {
        self.transforms.iter()
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Transform;
    type IntoIter = std::slice::Iter<'a, Transform>;

    fn into_iter(self) -> Self::IntoIter {
        self.transforms.iter()
    }
}
