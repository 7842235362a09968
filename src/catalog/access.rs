use crate::catalog::categories::{CategoryTable, Visibility};
use crate::session::Role;

/// Whether a stream of `category` is shown to `role`.
///
/// Positional streams (latitude/longitude) must be removed before this is
/// consulted; see [`crate::catalog::is_positional`].
#[must_use]
pub fn is_visible(category: &str, role: Role) -> bool {
    is_visible_in(CategoryTable::standard(), category, role)
}

#[must_use]
pub fn is_visible_in(table: &CategoryTable, category: &str, role: Role) -> bool {
    match table.visibility(category) {
        Visibility::Public => true,
        Visibility::Privileged => role == Role::Privileged,
    }
}
