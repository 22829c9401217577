use std::collections::HashSet;

/// Which selection representation a view wants. Some views keep selected
/// ids in click order (for "apply to these, in order" bulk actions),
/// others only need membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Ordered,
    Unordered,
}

/// The set of selected row identities, in one of two representations.
/// Semantics (membership, toggle, replace, clear) are identical under
/// either; only the iteration order of `ids` differs.
#[derive(Debug, Clone)]
pub enum Selection {
    Ordered(Vec<String>),
    Unordered(HashSet<String>),
}

impl Selection {
    pub fn new(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Ordered => Selection::Ordered(Vec::new()),
            SelectionMode::Unordered => Selection::Unordered(HashSet::new()),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            Selection::Ordered(_) => SelectionMode::Ordered,
            Selection::Unordered(_) => SelectionMode::Unordered,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        match self {
            Selection::Ordered(ids) => ids.iter().any(|i| i == id),
            Selection::Unordered(ids) => ids.contains(id),
        }
    }

    /// Flip membership of `id`, preserving the representation.
    pub fn toggle(&mut self, id: &str) {
        match self {
            Selection::Ordered(ids) => {
                if let Some(pos) = ids.iter().position(|i| i == id) {
                    ids.remove(pos);
                } else {
                    ids.push(id.to_string());
                }
            }
            Selection::Unordered(ids) => {
                if !ids.remove(id) {
                    ids.insert(id.to_string());
                }
            }
        }
    }

    /// Replace the whole selection. The ordered representation keeps the
    /// given order.
    pub fn replace(&mut self, new_ids: Vec<String>) {
        match self {
            Selection::Ordered(ids) => *ids = new_ids,
            Selection::Unordered(ids) => *ids = new_ids.into_iter().collect(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Selection::Ordered(ids) => ids.clear(),
            Selection::Unordered(ids) => ids.clear(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::Ordered(ids) => ids.len(),
            Selection::Unordered(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selected identities: insertion order for `Ordered`, sorted for
    /// `Unordered` so the result is deterministic.
    pub fn ids(&self) -> Vec<String> {
        match self {
            Selection::Ordered(ids) => ids.clone(),
            Selection::Unordered(ids) => {
                let mut out: Vec<String> = ids.iter().cloned().collect();
                out.sort();
                out
            }
        }
    }
}
