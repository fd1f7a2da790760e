use std::ptr::NonNull;

use itertools::Itertools;

use crate::{
    archetype::Archetype,
    component::{Component, ComponentId},
    signature::Signature,
};

///
/// Single query argument: `&T` borrows column of `T` for reading, `&mut T` for writing
///
pub trait Fetch {
    type Component: Component;
    type Slice<'a>;

    /// # Safety
    /// `data` must point to `len` live values of `Self::Component` which are not borrowed elsewhere
    /// mutably for `'a`.
    unsafe fn slice<'a>(data: NonNull<u8>, len: usize) -> Self::Slice<'a>;
}

impl<T> Fetch for &T
where
    T: Component,
{
    type Component = T;
    type Slice<'a> = &'a [T];

    #[inline]
    unsafe fn slice<'a>(data: NonNull<u8>, len: usize) -> Self::Slice<'a> {
        unsafe { std::slice::from_raw_parts(data.cast::<T>().as_ptr(), len) }
    }
}

impl<T> Fetch for &mut T
where
    T: Component,
{
    type Component = T;
    type Slice<'a> = &'a mut [T];

    #[inline]
    unsafe fn slice<'a>(data: NonNull<u8>, len: usize) -> Self::Slice<'a> {
        unsafe { std::slice::from_raw_parts_mut(data.cast::<T>().as_ptr(), len) }
    }
}

///
/// Tuple of [`Fetch`] arguments, e.g. `(&mut Position, &Velocity)`
///
pub trait Query {
    type Slices<'a>;

    fn component_ids() -> Vec<ComponentId>;

    /// Archetypes must contain this signature to match the query
    fn signature() -> Signature {
        Signature::new(Self::component_ids())
    }

    /// Every component is named only once
    fn is_disjoint() -> bool {
        Self::component_ids().into_iter().all_unique()
    }

    /// Returns `None` if archetype lacks any of the components.
    /// # Safety
    /// Components must be disjoint and archetype must not be borrowed elsewhere for `'a`.
    unsafe fn fetch<'a>(archetype: &'a Archetype) -> Option<Self::Slices<'a>>;
}

macro_rules! impl_query {
    ($($arg:ident),+) => {
        impl<$($arg),+> Query for ($($arg,)+)
        where
            $($arg: Fetch),+
        {
            type Slices<'a> = ($($arg::Slice<'a>,)+);

            fn component_ids() -> Vec<ComponentId> {
                vec![$(ComponentId::of::<$arg::Component>()),+]
            }

            unsafe fn fetch<'a>(archetype: &'a Archetype) -> Option<Self::Slices<'a>> {
                let len = archetype.len();
                Some(($(
                    unsafe {
                        $arg::slice(archetype.column_data(ComponentId::of::<$arg::Component>())?, len)
                    },
                )+))
            }
        }
    };
}

impl_query!(A);
impl_query!(A, B);
impl_query!(A, B, C);
impl_query!(A, B, C, D);
impl_query!(A, B, C, D, E);
impl_query!(A, B, C, D, E, F);

#[cfg(test)]
mod test {
    use crate::{component::ComponentId, signature};

    use super::Query;

    #[derive(Default)]
    struct Position;
    #[derive(Default)]
    struct Velocity;

    #[test]
    fn signature_of_tuple() {
        assert_eq!(
            signature![Position, Velocity],
            <(&mut Velocity, &Position)>::signature()
        );
        assert_eq!(
            vec![ComponentId::of::<Position>()],
            <(&Position,)>::component_ids()
        );
    }

    #[test]
    fn disjoint() {
        assert!(<(&mut Position, &Velocity)>::is_disjoint());
        assert!(!<(&Position, &Velocity, &mut Position)>::is_disjoint());
    }
}
