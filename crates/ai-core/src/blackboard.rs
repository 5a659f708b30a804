use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use thiserror::Error;

/// Typed name of a blackboard slot.
///
/// Two keys address the same slot when their names are equal; the type parameter only decides how the
/// stored value is read back.
pub struct BbKey<T: 'static> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for BbKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BbKey")
            .field("name", &self.name)
            .field("type", &type_name::<T>())
            .finish()
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("blackboard slot `{key}` does not hold a `{requested}`")]
    TypeMismatch {
        key: &'static str,
        requested: &'static str,
    },
}

/// Heterogeneous key/value store shared by every node of one tree instance.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<&'static str, Box<dyn Any>>,
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Slot names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.values.contains_key(key.name)
    }

    /// Stores `value`, returning `true` when an earlier value was replaced.
    pub fn set<T: 'static>(&mut self, key: BbKey<T>, value: T) -> bool {
        self.values.insert(key.name, Box::new(value)).is_some()
    }

    pub fn try_get<T: 'static>(&self, key: BbKey<T>) -> Result<Option<&T>, BlackboardError> {
        match self.values.get(key.name) {
            None => Ok(None),
            Some(value) => value
                .downcast_ref::<T>()
                .map(Some)
                .ok_or_else(|| mismatch::<T>(key)),
        }
    }

    pub fn try_get_mut<T: 'static>(
        &mut self,
        key: BbKey<T>,
    ) -> Result<Option<&mut T>, BlackboardError> {
        match self.values.get_mut(key.name) {
            None => Ok(None),
            Some(value) => value
                .downcast_mut::<T>()
                .map(Some)
                .ok_or_else(|| mismatch::<T>(key)),
        }
    }

    /// # Panics
    ///
    /// Panics when the slot holds a value of another type.
    pub fn get<T: 'static>(&self, key: BbKey<T>) -> Option<&T> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// # Panics
    ///
    /// Panics when the slot holds a value of another type.
    pub fn get_mut<T: 'static>(&mut self, key: BbKey<T>) -> Option<&mut T> {
        match self.try_get_mut(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// # Panics
    ///
    /// Panics when the slot already holds a value of another type.
    pub fn get_or_insert_with<T: 'static>(&mut self, key: BbKey<T>, init: impl FnOnce() -> T) -> &mut T {
        let slot = self
            .values
            .entry(key.name)
            .or_insert_with(|| Box::new(init()));
        match slot.downcast_mut::<T>() {
            Some(value) => value,
            None => panic!("{}", mismatch::<T>(key)),
        }
    }

    /// Removes the slot. A value of another type is left in place and reported as an error.
    pub fn remove<T: 'static>(&mut self, key: BbKey<T>) -> Result<Option<T>, BlackboardError> {
        match self.values.get(key.name) {
            None => Ok(None),
            Some(value) if !value.is::<T>() => Err(mismatch::<T>(key)),
            Some(_) => Ok(self
                .values
                .remove(key.name)
                .and_then(|value| value.downcast::<T>().ok())
                .map(|value| *value)),
        }
    }
}

fn mismatch<T: 'static>(key: BbKey<T>) -> BlackboardError {
    BlackboardError::TypeMismatch {
        key: key.name,
        requested: type_name::<T>(),
    }
}
