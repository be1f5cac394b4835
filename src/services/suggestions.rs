/// Ingredient names containing `term`, case-insensitively, in catalog order.
///
/// A blank term suggests nothing.
pub fn suggest_ingredients(all: &[String], term: &str, limit: usize) -> Vec<String> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    all.iter()
        .filter(|name| name.to_lowercase().contains(&term))
        .take(limit)
        .cloned()
        .collect()
}
