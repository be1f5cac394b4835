use rand::{seq::SliceRandom, Rng};
use std::collections::HashSet;

use crate::models::{RecipeId, RecipeSummary};

/// Keeps the entries of `a` whose identifier also appears in `b`.
///
/// Order follows `a`. Duplicates in `a` pass through untouched.
pub fn intersect_by_id(a: &[RecipeSummary], b: &[RecipeSummary]) -> Vec<RecipeSummary> {
    let ids: HashSet<&RecipeId> = b.iter().map(|recipe| &recipe.id).collect();
    a.iter()
        .filter(|recipe| ids.contains(&recipe.id))
        .cloned()
        .collect()
}

/// Picks one element uniformly over `[0, len)`; `None` when `items` is empty
pub fn pick_random<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    items.choose(rng)
}
