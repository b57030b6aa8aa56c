//! Row mutators and the item transform applied to each fetched row.

use std::fmt;
use std::sync::Arc;

/// A caller supplied function that reshapes a fetched row in place.
pub type RowMutator<R> = Arc<dyn Fn(&mut R) + Send + Sync>;

/// The row mutators collected while translating a plan, applied in registration order.
pub struct ItemTransform<R> {
    mutators: Vec<RowMutator<R>>,
}

impl<R> ItemTransform<R> {
    pub fn identity() -> Self {
        ItemTransform {
            mutators: Vec::new(),
        }
    }

    pub fn push(&mut self, mutator: RowMutator<R>) {
        self.mutators.push(mutator);
    }

    pub fn is_identity(&self) -> bool {
        self.mutators.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutators.is_empty()
    }

    /// Run every mutator over the row, each seeing the result of the previous one.
    pub fn apply(&self, mut row: R) -> R {
        for mutator in &self.mutators {
            mutator(&mut row);
        }
        row
    }
}

impl<R> Default for ItemTransform<R> {
    fn default() -> Self {
        ItemTransform::identity()
    }
}

impl<R> Clone for ItemTransform<R> {
    fn clone(&self) -> Self {
        ItemTransform {
            mutators: self.mutators.clone(),
        }
    }
}

impl<R> fmt::Debug for ItemTransform<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemTransform")
            .field("mutators", &self.mutators.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_returns_the_row_untouched() {
        let transform = ItemTransform::<i32>::identity();
        assert!(transform.is_identity());
        assert_eq!(transform.apply(7), 7);
    }

    #[test]
    fn mutators_compose_in_registration_order() {
        let mut transform = ItemTransform::<i32>::identity();
        transform.push(Arc::new(|row: &mut i32| *row += 1));
        transform.push(Arc::new(|row: &mut i32| *row *= 10));
        assert_eq!(transform.apply(1), 20);
    }
}
