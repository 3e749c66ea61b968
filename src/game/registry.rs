//! # Instance Registry
//!
//! Process-wide holder that keeps at most one live instance per type.
//!
//! Components call [`InstanceRegistry::register`] from their own startup hook and
//! [`InstanceRegistry::unregister`] from their teardown hook. The registry never
//! constructs anything itself: [`InstanceRegistry::get_instance`] only hands out
//! what has already been registered.
//!
//! ```rust
//! use std::sync::Arc;
//! use downhill::game::registry::{InstanceRegistry, Placement, Registration};
//!
//! struct Announcer;
//!
//! let registry = InstanceRegistry::new();
//! let first = Arc::new(Announcer);
//! let second = Arc::new(Announcer);
//!
//! assert!(registry.register(&first, Placement::Root).is_accepted());
//! assert_eq!(registry.register(&second, Placement::Root), Registration::Rejected);
//! assert!(Arc::ptr_eq(&registry.get_instance::<Announcer>().unwrap(), &first));
//!
//! registry.mark_shutting_down();
//! assert!(registry.get_instance::<Announcer>().is_none());
//! ```

use log::{debug, info};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::metrics;

static GLOBAL: OnceLock<InstanceRegistry> = OnceLock::new();

/// Where the registering object sits in the host's object graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// No parent container; the instance asks to survive scene loads.
    Root,
    /// Owned by some parent; lives and dies with it.
    Nested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Accepted { persistent: bool },
    /// Another instance already holds the slot (or the registry is shutting
    /// down). The caller is expected to drop its instance.
    Rejected,
}

impl Registration {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Registration::Accepted { .. })
    }
}

struct Slot {
    instance: Arc<dyn Any + Send + Sync>,
    persistent: bool,
}

#[derive(Default)]
pub struct InstanceRegistry {
    slots: Mutex<HashMap<TypeId, Slot>>,
    shutting_down: AtomicBool,
}

impl InstanceRegistry {
    /// A standalone registry. Most code wants [`InstanceRegistry::global`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static InstanceRegistry {
        GLOBAL.get_or_init(InstanceRegistry::new)
    }

    pub fn get_instance<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        if self.is_shutting_down() {
            return None;
        }
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.get(&TypeId::of::<T>())?;
        Arc::clone(&slot.instance).downcast::<T>().ok()
    }

    pub fn register<T>(&self, instance: &Arc<T>, placement: Placement) -> Registration
    where
        T: Any + Send + Sync,
    {
        if self.is_shutting_down() {
            debug!("Ignoring registration of {} during shutdown", type_name::<T>());
            return Registration::Rejected;
        }
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = slots.get(&TypeId::of::<T>()) {
            if Self::holds(existing, instance) {
                return Registration::Accepted {
                    persistent: existing.persistent,
                };
            }
            drop(slots);
            info!(
                "Duplicate {} detected; discarding the new instance",
                type_name::<T>()
            );
            metrics::inc_duplicates_rejected();
            return Registration::Rejected;
        }

        let persistent = placement == Placement::Root;
        let erased: Arc<dyn Any + Send + Sync> = instance.clone();
        slots.insert(
            TypeId::of::<T>(),
            Slot {
                instance: erased,
                persistent,
            },
        );
        debug!(
            "Registered {} (persistent across scenes: {})",
            type_name::<T>(),
            persistent
        );
        Registration::Accepted { persistent }
    }

    /// Clears the slot only if `instance` is the one currently held, so a
    /// rejected duplicate tearing down cannot evict the real instance.
    pub fn unregister<T>(&self, instance: &Arc<T>) -> bool
    where
        T: Any + Send + Sync,
    {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.get(&TypeId::of::<T>()) {
            Some(existing) if Self::holds(existing, instance) => {
                slots.remove(&TypeId::of::<T>());
                debug!("Unregistered {}", type_name::<T>());
                true
            }
            _ => false,
        }
    }

    pub fn is_persistent<T>(&self) -> bool
    where
        T: Any + Send + Sync,
    {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .map(|slot| slot.persistent)
            .unwrap_or(false)
    }

    /// Set-once. Every later lookup yields `None`.
    pub fn mark_shutting_down(&self) {
        if !self.shutting_down.swap(true, Ordering::SeqCst) {
            info!("Instance registry shutting down");
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    fn holds<T: Any + Send + Sync>(slot: &Slot, instance: &Arc<T>) -> bool {
        // Compare data pointers only; vtable pointers of the erased Arc are not stable.
        std::ptr::eq(
            Arc::as_ptr(&slot.instance) as *const u8,
            Arc::as_ptr(instance) as *const u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Widget(u32);

    #[test]
    fn nested_placement_is_not_persistent() {
        let registry = InstanceRegistry::new();
        let w = Arc::new(Widget(1));
        assert_eq!(
            registry.register(&w, Placement::Nested),
            Registration::Accepted { persistent: false }
        );
        assert!(!registry.is_persistent::<Widget>());
    }

    #[test]
    fn same_object_registers_twice() {
        let registry = InstanceRegistry::new();
        let w = Arc::new(Widget(1));
        assert!(registry.register(&w, Placement::Root).is_accepted());
        assert_eq!(
            registry.register(&w, Placement::Nested),
            Registration::Accepted { persistent: true }
        );
    }

    #[test]
    fn types_have_independent_slots() {
        let registry = InstanceRegistry::new();
        let w = Arc::new(Widget(7));
        let s = Arc::new(String::from("slope"));
        assert!(registry.register(&w, Placement::Root).is_accepted());
        assert!(registry.register(&s, Placement::Root).is_accepted());
        assert_eq!(registry.get_instance::<Widget>().unwrap().0, 7);
        assert_eq!(registry.get_instance::<String>().unwrap().as_str(), "slope");
        assert!(registry.get_instance::<u64>().is_none());
    }

    #[test]
    fn registration_rejected_after_shutdown() {
        let registry = InstanceRegistry::new();
        registry.mark_shutting_down();
        registry.mark_shutting_down();
        let w = Arc::new(Widget(1));
        assert_eq!(registry.register(&w, Placement::Root), Registration::Rejected);
        assert!(registry.is_shutting_down());
    }
}
