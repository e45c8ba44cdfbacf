//! Upstream singular-vs-plural field shapes.

/// A field upstream sometimes supplies once, sometimes as a list, and
/// sometimes not at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Shape<T> {
    #[default]
    Absent,
    Single(T),
    Many(Vec<T>),
}

impl<T> Shape<T> {
    /// Classify a list of occurrences by how many there are.
    pub fn from_vec(mut items: Vec<T>) -> Self {
        if items.len() > 1 {
            Shape::Many(items)
        } else {
            items.pop().map_or(Shape::Absent, Shape::Single)
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Shape::Absent)
    }

    /// Normalise to a sequence: absent is empty, single is a one-element list.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Shape::Absent => Vec::new(),
            Shape::Single(item) => vec![item],
            Shape::Many(items) => items,
        }
    }

    /// Normalise to a sequence, keeping only items `f` accepts.
    pub fn filter_map<U>(self, f: impl FnMut(T) -> Option<U>) -> Vec<U> {
        self.into_vec().into_iter().filter_map(f).collect()
    }
}

impl<T> From<Option<T>> for Shape<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Shape::Absent, Shape::Single)
    }
}
