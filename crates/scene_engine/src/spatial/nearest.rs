//! Nearest-neighbour linear scan

use crate::foundation::math::utils::dist_sq;
use crate::foundation::math::Vec2;

/// Winner of a nearest-neighbour scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest<K> {
    /// Candidate key
    pub key: K,
    /// Euclidean distance to the query point
    pub distance: f32,
}

/// Find the candidate closest to `origin` within `range`
///
/// Candidates are compared by squared distance; only the winner pays for a
/// square root. A strictly smaller distance is required to replace the current
/// best, so on ties the earliest candidate wins. The range check is inclusive
/// and applied to the winner only.
pub fn nearest<K, I>(origin: &Vec2, candidates: I, range: f32) -> Option<Nearest<K>>
where
    I: IntoIterator<Item = (K, Vec2)>,
{
    let mut best: Option<(K, f32)> = None;

    for (key, pos) in candidates {
        let d2 = dist_sq(origin, &pos);
        match best {
            Some((_, best_d2)) if d2 >= best_d2 => {}
            _ => best = Some((key, d2)),
        }
    }

    let (key, d2) = best?;
    let distance = d2.sqrt();
    (distance <= range).then_some(Nearest { key, distance })
}
