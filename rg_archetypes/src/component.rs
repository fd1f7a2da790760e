use std::{
    any::{TypeId, type_name},
    fmt::Display,
    ptr::{self, NonNull},
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use fxhash::FxHashMap;
use log::debug;
use once_cell::sync::Lazy;

///
/// Anything that can be stored in an archetype column
///
pub trait Component: Default + Send + 'static {}

impl<T> Component for T where T: Default + Send + 'static {}

///
/// ComponentId
///
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[repr(transparent)]
pub struct ComponentId(u64);

static TYPE_IDS: Lazy<Mutex<FxHashMap<TypeId, ComponentId>>> = Lazy::new(Default::default);

// Zero is never handed out
static TYPE_SEQ: AtomicU64 = AtomicU64::new(1);

impl ComponentId {
    /// Returns process-wide id of type `T`. Ids are assigned in first-use order.
    pub fn of<T: 'static>() -> Self {
        let mut guard = TYPE_IDS.lock().unwrap_or_else(PoisonError::into_inner);
        *guard
            .entry(TypeId::of::<T>())
            .or_insert_with(|| ComponentId(TYPE_SEQ.fetch_add(1, Ordering::Relaxed)))
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

///
/// ComponentDescriptor
///
/// Type-erased operations on a single slot holding a value of the described type.
/// All slot pointers must be aligned for that type.
///
#[derive(Clone, Copy)]
pub struct ComponentDescriptor {
    id: ComponentId,
    name: &'static str,
    size: usize,
    align: usize,
    construct_default: unsafe fn(*mut u8),
    relocate: unsafe fn(*mut u8, *mut u8),
    destroy: unsafe fn(*mut u8),
}

impl ComponentDescriptor {
    pub fn of<T: Component>() -> Self {
        unsafe fn construct_default<T: Component>(dst: *mut u8) {
            unsafe { ptr::write(dst.cast::<T>(), T::default()) }
        }

        unsafe fn relocate<T: Component>(src: *mut u8, dst: *mut u8) {
            unsafe { ptr::copy_nonoverlapping(src.cast::<T>(), dst.cast::<T>(), 1) }
        }

        unsafe fn destroy<T: Component>(slot: *mut u8) {
            unsafe { ptr::drop_in_place(slot.cast::<T>()) }
        }

        ComponentDescriptor {
            id: ComponentId::of::<T>(),
            name: type_name::<T>(),
            size: size_of::<T>(),
            align: align_of::<T>(),
            construct_default: construct_default::<T>,
            relocate: relocate::<T>,
            destroy: destroy::<T>,
        }
    }

    #[inline]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn align(&self) -> usize {
        self.align
    }

    /// Writes default value into `dst`.
    /// # Safety
    /// `dst` must be valid for writes and must not hold a live value.
    #[inline]
    pub unsafe fn construct_default(&self, dst: NonNull<u8>) {
        unsafe { (self.construct_default)(dst.as_ptr()) }
    }

    /// Moves value from `src` to `dst`. After the call `src` holds no live value.
    /// # Safety
    /// `src` must hold a live value, `dst` must not, and the slots must not overlap.
    #[inline]
    pub unsafe fn relocate(&self, src: NonNull<u8>, dst: NonNull<u8>) {
        unsafe { (self.relocate)(src.as_ptr(), dst.as_ptr()) }
    }

    /// Drops value stored in `slot`.
    /// # Safety
    /// `slot` must hold a live value which is never used again.
    #[inline]
    pub unsafe fn destroy(&self, slot: NonNull<u8>) {
        unsafe { (self.destroy)(slot.as_ptr()) }
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &self.size)
            .field("align", &self.align)
            .finish()
    }
}

///
/// ComponentRegistry
///
#[derive(Default, Debug)]
pub struct ComponentRegistry {
    descriptors: FxHashMap<ComponentId, ComponentDescriptor>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers type `T` and returns its id. Repeated calls return the same id.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        self.describe::<T>().id()
    }

    /// Returns descriptor of `T`, creating it on first call.
    pub fn describe<T: Component>(&mut self) -> &ComponentDescriptor {
        self.descriptors
            .entry(ComponentId::of::<T>())
            .or_insert_with(|| {
                let descriptor = ComponentDescriptor::of::<T>();
                debug!("Registered {} as {}", descriptor.name(), descriptor.id());
                descriptor
            })
    }

    #[inline]
    pub fn get(&self, id: ComponentId) -> Option<&ComponentDescriptor> {
        self.descriptors.get(&id)
    }

    #[inline]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.descriptors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
