//! Parameter storage: numeric groups plus abstract values.

use weft_core::{AbstractValue, Scalar, VectorBase};

/// The parameters of a context.
///
/// Numeric parameters are a sequence of independently-sized vector
/// groups; abstract parameters are a sequence of type-erased values.
/// Both are addressed by declaration order.
#[derive(Clone, Debug)]
pub struct Parameters<T: Scalar> {
    numeric: Vec<Box<dyn VectorBase<T>>>,
    abstracts: Vec<Box<dyn AbstractValue>>,
}

impl<T: Scalar> Default for Parameters<T> {
    fn default() -> Self {
        Self {
            numeric: Vec::new(),
            abstracts: Vec::new(),
        }
    }
}

impl<T: Scalar> Parameters<T> {
    /// Bundle numeric groups and abstract values.
    pub fn new(numeric: Vec<Box<dyn VectorBase<T>>>, abstracts: Vec<Box<dyn AbstractValue>>) -> Self {
        Self { numeric, abstracts }
    }

    /// A parameter set with no groups and no values.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of numeric parameter groups.
    pub fn num_numeric_groups(&self) -> usize {
        self.numeric.len()
    }

    /// Borrow numeric group `i`. Panics if out of range.
    pub fn numeric(&self, i: usize) -> &dyn VectorBase<T> {
        &*self.numeric[i]
    }

    /// Mutably borrow numeric group `i`. Panics if out of range.
    pub fn numeric_mut(&mut self, i: usize) -> &mut dyn VectorBase<T> {
        &mut *self.numeric[i]
    }

    /// Number of abstract parameters.
    pub fn num_abstract(&self) -> usize {
        self.abstracts.len()
    }

    /// Borrow abstract parameter `i`. Panics if out of range.
    pub fn abstract_value(&self, i: usize) -> &dyn AbstractValue {
        &*self.abstracts[i]
    }

    /// Mutably borrow abstract parameter `i`. Panics if out of range.
    pub fn abstract_value_mut(&mut self, i: usize) -> &mut dyn AbstractValue {
        &mut *self.abstracts[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::{DenseVector, Value};

    #[test]
    fn groups_are_independently_sized() {
        let params = Parameters::<f64>::new(
            vec![
                Box::new(DenseVector::zeros(3)),
                Box::new(DenseVector::zeros(1)),
            ],
            vec![Value::boxed("gain schedule".to_string())],
        );
        assert_eq!(params.num_numeric_groups(), 2);
        assert_eq!(params.numeric(0).len(), 3);
        assert_eq!(params.numeric(1).len(), 1);
        assert_eq!(params.num_abstract(), 1);
    }
}
