/// Local copy of one piece of remote state.
///
/// A slot starts `NotFetched`. Refetches and pushed events both land through
/// [`Cached::fresh`], so readers never know which one produced the value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Cached<T> {
    #[default]
    NotFetched,
    Loaded { value: T, stale: bool },
}

impl<T> Cached<T> {
    pub fn fresh(value: T) -> Self {
        Cached::Loaded { value, stale: false }
    }

    /// Keeps the old value on screen while a refetch is outstanding.
    pub fn mark_stale(&mut self) {
        if let Cached::Loaded { stale, .. } = self {
            *stale = true;
        }
    }

    /// Drops the stale mark after a refetch failed, keeping the last value.
    pub fn clear_stale(&mut self) {
        if let Cached::Loaded { stale, .. } = self {
            *stale = false;
        }
    }

    pub fn reset(&mut self) {
        *self = Cached::NotFetched;
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Cached::NotFetched => None,
            Cached::Loaded { value, .. } => Some(value),
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, Cached::Loaded { .. })
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Cached::Loaded { stale: true, .. })
    }
}

impl<T: Clone> Cached<T> {
    pub fn get(&self) -> Option<T> {
        self.value().cloned()
    }
}

/// Slots a confirmed action can invalidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RemoteField {
    Position,
    Balance,
    Allowance,
    TotalStaked,
}
