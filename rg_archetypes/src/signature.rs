use std::{cmp::Ordering, fmt::Display, slice::Iter};

use itertools::Itertools;

use crate::component::ComponentId;

///
/// Sorted set of component ids without duplicates
///
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Signature(Vec<ComponentId>);

impl Signature {
    pub fn new(ids: impl IntoIterator<Item = ComponentId>) -> Self {
        Signature(ids.into_iter().sorted_unstable().dedup().collect())
    }

    #[inline]
    pub fn from_slice(ids: &[ComponentId]) -> Self {
        Self::new(ids.iter().copied())
    }

    pub fn empty() -> Self {
        Signature(Vec::new())
    }

    /// Returns copy of this signature extended with `id`
    pub fn with(&self, id: ComponentId) -> Self {
        match self.0.binary_search(&id) {
            Ok(_) => self.clone(),
            Err(pos) => {
                let mut ids = Vec::with_capacity(self.0.len() + 1);
                ids.extend_from_slice(&self.0[..pos]);
                ids.push(id);
                ids.extend_from_slice(&self.0[pos..]);
                Signature(ids)
            }
        }
    }

    /// Returns copy of this signature without `id`
    pub fn without(&self, id: ComponentId) -> Self {
        Signature(self.0.iter().copied().filter(|v| *v != id).collect())
    }

    #[inline]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.position(id).is_some()
    }

    /// Index of `id` in this signature (which is also the column index in archetype)
    #[inline]
    pub fn position(&self, id: ComponentId) -> Option<usize> {
        self.0.binary_search(&id).ok()
    }

    /// Checks that every id of `other` is present in this signature
    pub fn is_superset_of(&self, other: &Signature) -> bool {
        let mut mine = self.0.iter();
        'outer: for id in other.0.iter() {
            for candidate in mine.by_ref() {
                match candidate.cmp(id) {
                    Ordering::Less => continue,
                    Ordering::Equal => continue 'outer,
                    Ordering::Greater => return false,
                }
            }
            return false;
        }
        true
    }

    pub fn iter(&self) -> Iter<'_, ComponentId> {
        self.0.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[ComponentId] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ComponentId> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentId>>(iter: I) -> Self {
        Signature::new(iter)
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a ComponentId;
    type IntoIter = Iter<'a, ComponentId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.iter().map(|id| id.value()).join(", "))
    }
}

///
/// Macros
///
#[macro_export]
macro_rules! signature {
    ($($component:ty),* $(,)?) => {
        $crate::signature::Signature::from_slice(&[
            $($crate::component::ComponentId::of::<$component>()),*
        ])
    };
}
