//! Uniform sampling of matched pairs without replacement.

use rand::Rng;
use rand::seq::index;

use super::DatasetError;

/// Draw `amount` distinct items uniformly, without replacement.
///
/// The result is in draw order, not input order.
pub fn sample<T: Clone, R: Rng + ?Sized>(
    items: &[T],
    amount: usize,
    rng: &mut R,
) -> Result<Vec<T>, DatasetError> {
    if amount > items.len() {
        return Err(DatasetError::SampleTooLarge {
            requested: amount,
            available: items.len(),
        });
    }
    Ok(index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|idx| items[idx].clone())
        .collect())
}
