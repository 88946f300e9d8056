//! Presence-tracked level fields.
//!
//! A level field is either explicitly set or left unset so that it inherits
//! from the parent chain. A set zero and an unset field are different states.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A level property that may be inherited.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field<T> {
    /// No value of its own; the merged view takes the nearest ancestor's value.
    #[default]
    Unset,
    /// An explicit value that shadows every ancestor.
    Set(T),
}

impl<T> Field<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Field::Set(_))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Field::Unset)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Set(value) => Some(value),
            Field::Unset => None,
        }
    }
}

impl<T: Clone> Field<T> {
    /// Copy `ancestor`'s value when this field is unset.
    ///
    /// Returns true when a value was inherited.
    pub fn inherit_from(&mut self, ancestor: &Field<T>) -> bool {
        if self.is_unset()
            && let Field::Set(value) = ancestor
        {
            *self = Field::Set(value.clone());
            return true;
        }
        false
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Set(value)
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Field::Unset, Field::Set)
    }
}

// `Unset` encodes as null; containing structs skip it entirely.
impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Set(value) => serializer.serialize_some(value),
            Field::Unset => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}
