//! The dense numeric vector contract and its standard implementation.
//!
//! [`VectorBase`] is the object-safe contract the runtime consumes:
//! size, elementwise access, bulk copies, an explicit contiguity probe,
//! and optional per-element bound metadata. [`DenseVector`] is the
//! standard contiguous implementation — the only kind schema-legal
//! inside an allocated context. Scatter-gather views can implement the
//! trait (they return `None` from the contiguity probe) and are rejected
//! by the allocator's invariant check.

use dyn_clone::DynClone;
use std::fmt::Debug;

use crate::error::DeclarationError;
use crate::scalar::Scalar;

/// Object-safe contract for a numeric vector.
pub trait VectorBase<T: Scalar>: DynClone + Debug {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Whether the vector has zero elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read element `i`.
    ///
    /// Panics if `i >= len()`; indices come from declaration-time sizes,
    /// so an out-of-range access is a bug, not a runtime condition.
    fn get(&self, i: usize) -> T;

    /// Write element `i`. Panics if `i >= len()`.
    fn set(&mut self, i: usize, v: T);

    /// Contiguity probe: the elements as one slice, or `None` when the
    /// storage is not contiguous.
    fn as_slice(&self) -> Option<&[T]>;

    /// Mutable contiguity probe.
    fn as_mut_slice(&mut self) -> Option<&mut [T]>;

    /// Overwrite every element from `other`.
    ///
    /// Lengths must match exactly.
    fn set_from(&mut self, other: &dyn VectorBase<T>) -> Result<(), DeclarationError> {
        if self.len() != other.len() {
            return Err(DeclarationError::VectorSizeMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        for i in 0..self.len() {
            self.set(i, other.get(i));
        }
        Ok(())
    }

    /// Overwrite every element from a slice. Lengths must match exactly.
    fn set_from_slice(&mut self, data: &[T]) -> Result<(), DeclarationError> {
        if self.len() != data.len() {
            return Err(DeclarationError::VectorSizeMismatch {
                expected: self.len(),
                actual: data.len(),
            });
        }
        for (i, &v) in data.iter().enumerate() {
            self.set(i, v);
        }
        Ok(())
    }

    /// Set every element to `v`.
    fn fill(&mut self, v: T) {
        for i in 0..self.len() {
            self.set(i, v);
        }
    }

    /// Per-element inclusive bounds `(lower, upper)`, when declared.
    ///
    /// Entries may be ±infinity. `None` means no bound metadata at all;
    /// the constraint auto-derivation treats both the same way.
    fn element_bounds(&self) -> Option<(&[f64], &[f64])> {
        None
    }

    /// Copy into a fresh contiguous [`DenseVector`].
    fn to_dense(&self) -> DenseVector<T> {
        let mut out = DenseVector::zeros(self.len());
        for i in 0..self.len() {
            out.set(i, self.get(i));
        }
        out
    }
}

dyn_clone::clone_trait_object!(<T> VectorBase<T> where T: Scalar);

/// The standard contiguous vector, with optional per-element bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseVector<T: Scalar> {
    data: Vec<T>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl<T: Scalar> DenseVector<T> {
    /// A vector of `n` zeros.
    pub fn zeros(n: usize) -> Self {
        Self::from_vec(vec![T::ZERO; n])
    }

    /// A vector of `n` copies of `v`.
    pub fn constant(n: usize, v: T) -> Self {
        Self::from_vec(vec![v; n])
    }

    /// A vector owning the given elements, with no bound metadata.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            data,
            lower: Vec::new(),
            upper: Vec::new(),
        }
    }

    /// A vector with per-element inclusive bounds.
    ///
    /// `lower` and `upper` must each have the same length as `data`;
    /// use ±infinity for unbounded elements.
    pub fn with_bounds(
        data: Vec<T>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Result<Self, DeclarationError> {
        if lower.len() != data.len() || upper.len() != data.len() {
            return Err(DeclarationError::VectorSizeMismatch {
                expected: data.len(),
                actual: lower.len().max(upper.len()),
            });
        }
        Ok(Self { data, lower, upper })
    }

    /// Borrow the elements as a slice.
    pub fn values(&self) -> &[T] {
        &self.data
    }

    /// Mutably borrow the elements as a slice.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Scalar> VectorBase<T> for DenseVector<T> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn get(&self, i: usize) -> T {
        self.data[i]
    }

    fn set(&mut self, i: usize, v: T) {
        self.data[i] = v;
    }

    fn as_slice(&self) -> Option<&[T]> {
        Some(&self.data)
    }

    fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        Some(&mut self.data)
    }

    fn element_bounds(&self) -> Option<(&[f64], &[f64])> {
        if self.lower.is_empty() && self.upper.is_empty() {
            None
        } else {
            Some((&self.lower, &self.upper))
        }
    }

    fn to_dense(&self) -> DenseVector<T> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_vector_is_contiguous() {
        let mut v = DenseVector::<f64>::zeros(3);
        assert_eq!(v.as_slice(), Some(&[0.0, 0.0, 0.0][..]));
        v.set(1, 5.0);
        assert_eq!(v.get(1), 5.0);
        assert_eq!(v.as_mut_slice().unwrap().len(), 3);
    }

    #[test]
    fn set_from_requires_matching_length() {
        let mut a = DenseVector::<f64>::zeros(2);
        let b = DenseVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            a.set_from(&b),
            Err(DeclarationError::VectorSizeMismatch {
                expected: 2,
                actual: 3
            })
        ));
        let c = DenseVector::from_vec(vec![4.0, 5.0]);
        a.set_from(&c).unwrap();
        assert_eq!(a.values(), &[4.0, 5.0]);
    }

    #[test]
    fn bounds_metadata_roundtrip() {
        let v = DenseVector::with_bounds(
            vec![0.0_f64, 0.0],
            vec![f64::NEG_INFINITY, -1.0],
            vec![1.0, f64::INFINITY],
        )
        .unwrap();
        let (lower, upper) = v.element_bounds().unwrap();
        assert_eq!(lower, &[f64::NEG_INFINITY, -1.0]);
        assert_eq!(upper, &[1.0, f64::INFINITY]);

        let unbounded = DenseVector::<f64>::zeros(2);
        assert!(unbounded.element_bounds().is_none());
    }

    #[test]
    fn boxed_clone_is_deep() {
        let original: Box<dyn VectorBase<f64>> = Box::new(DenseVector::from_vec(vec![1.0]));
        let mut copy = original.clone();
        copy.set(0, 9.0);
        assert_eq!(original.get(0), 1.0);
        assert_eq!(copy.get(0), 9.0);
    }

    #[test]
    fn fill_and_to_dense() {
        let mut v = DenseVector::<f32>::zeros(4);
        v.fill(2.0);
        assert_eq!(v.values(), &[2.0; 4]);
        assert_eq!(v.to_dense().values(), &[2.0; 4]);
    }
}
