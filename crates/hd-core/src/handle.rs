// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Typed, generation-checked handles to resources owned by a registry.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker implemented by the zero-sized tag types that distinguish handle kinds.
///
/// The tag only exists at compile time: a `Handle<TextureTag>` can never be
/// passed where a `Handle<BufferTag>` is expected.
pub trait HandleTag: 'static {
    /// A human readable name of the resource kind, used in logs and errors.
    const KIND: &'static str;
}

/// An opaque reference to a resource living in a registry arena.
///
/// A handle is the pair `(slot index, generation)`. Generation `0` is the
/// invalid sentinel, so `Handle::default()` is invalid. Handles carry no
/// ownership: dropping one does not release anything, and copies of a handle
/// whose resource was destroyed are detected by the registry because the slot
/// generation has moved on.
pub struct Handle<T: HandleTag> {
    index: u32,
    generation: u32,
    _tag: PhantomData<fn() -> T>,
}

impl<T: HandleTag> Handle<T> {
    /// The invalid sentinel handle.
    pub const INVALID: Self = Self {
        index: 0,
        generation: 0,
        _tag: PhantomData,
    };

    /// Builds a handle from its raw parts. Only the registry hands these out.
    pub(crate) const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _tag: PhantomData,
        }
    }

    /// Returns `true` unless this handle holds the invalid sentinel.
    ///
    /// This does not prove the resource is still alive; a stale copy of a
    /// destroyed handle stays "valid" here and is rejected by the registry.
    pub const fn is_valid(&self) -> bool {
        self.generation != 0
    }

    /// Resets this handle to the invalid sentinel.
    pub fn invalidate(&mut self) {
        *self = Self::INVALID;
    }

    /// The arena slot this handle points at.
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// The generation of the slot at the time the handle was issued.
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T: HandleTag> Default for Handle<T> {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<T: HandleTag> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: HandleTag> Copy for Handle<T> {}

impl<T: HandleTag> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T: HandleTag> Eq for Handle<T> {}

impl<T: HandleTag> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T: HandleTag> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}({}v{})", T::KIND, self.index, self.generation)
        } else {
            write!(f, "{}(invalid)", T::KIND)
        }
    }
}

/// A location of a named constant (uniform) inside a linked program.
///
/// Lookups that fail do not error; they return [`ProgramConstant::INVALID`]
/// (raw value `-1`) and callers are expected to test [`is_valid`](Self::is_valid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramConstant(i32);

impl ProgramConstant {
    /// The sentinel returned when a constant name does not exist.
    pub const INVALID: Self = Self(-1);

    /// Wraps a raw native location.
    pub const fn new(location: i32) -> Self {
        Self(location)
    }

    /// Returns `true` unless this is the `-1` sentinel.
    pub const fn is_valid(&self) -> bool {
        self.0 != Self::INVALID.0
    }

    /// Resets this constant to the sentinel.
    pub fn invalidate(&mut self) {
        *self = Self::INVALID;
    }

    /// The raw native location, or `None` for the sentinel.
    pub fn location(&self) -> Option<u32> {
        u32::try_from(self.0).ok()
    }
}

impl Default for ProgramConstant {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum TestTag {}
    impl HandleTag for TestTag {
        const KIND: &'static str = "Test";
    }

    #[test]
    fn default_handle_is_invalid() {
        let handle = Handle::<TestTag>::default();
        assert!(!handle.is_valid());
        assert_eq!(handle, Handle::INVALID);
    }

    #[test]
    fn invalidate_resets_to_sentinel() {
        let mut handle = Handle::<TestTag>::from_raw_parts(3, 7);
        assert!(handle.is_valid());
        handle.invalidate();
        assert!(!handle.is_valid());
        assert_eq!(handle.generation(), 0);
    }

    #[test]
    fn equality_uses_index_and_generation() {
        let a = Handle::<TestTag>::from_raw_parts(1, 1);
        let b = Handle::<TestTag>::from_raw_parts(1, 2);
        let a_again = Handle::<TestTag>::from_raw_parts(1, 1);
        assert_eq!(a, a_again);
        assert_ne!(a, b);
    }

    #[test]
    fn debug_output_names_the_kind() {
        let handle = Handle::<TestTag>::from_raw_parts(4, 2);
        assert_eq!(format!("{handle:?}"), "Test(4v2)");
        assert_eq!(format!("{:?}", Handle::<TestTag>::INVALID), "Test(invalid)");
    }

    #[test]
    fn program_constant_sentinel() {
        let mut constant = ProgramConstant::new(5);
        assert!(constant.is_valid());
        assert_eq!(constant.location(), Some(5));
        constant.invalidate();
        assert!(!constant.is_valid());
        assert_eq!(constant.location(), None);
        assert_eq!(ProgramConstant::default(), ProgramConstant::INVALID);
    }
}
