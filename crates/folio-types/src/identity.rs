use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The terminal generation. A slot whose generation reaches this value is
/// retired and never handed out again.
pub const MAX_GENERATION: u16 = u16::MAX;

/// Identity of a stored object within one store.
///
/// An `ObjectId` pairs the cross-reference slot number with the slot's
/// generation at the time the identity was handed out. A stale handle (one
/// whose slot has since been deleted) keeps its old generation and can be
/// detected by comparing against the slot.
///
/// `(0, MAX_GENERATION)` is the free-list head and never names a real object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    /// Slot number in the cross-reference table.
    pub number: u32,
    /// Generation of the slot when this identity was issued.
    pub generation: u16,
}

impl ObjectId {
    /// Create an identity from a number and generation.
    pub const fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }

    /// The sentinel identity `(0, MAX_GENERATION)`.
    pub const fn sentinel() -> Self {
        Self {
            number: 0,
            generation: MAX_GENERATION,
        }
    }

    /// Returns `true` if this is the sentinel identity.
    pub fn is_sentinel(&self) -> bool {
        *self == Self::sentinel()
    }

    /// The object-body header, e.g. `"12 0 obj"`.
    pub fn header(&self) -> String {
        format!("{} {} obj", self.number, self.generation)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            write!(f, "ObjectId(sentinel)")
        } else {
            write!(f, "ObjectId({}v{})", self.number, self.generation)
        }
    }
}

/// Formats as a reference token, e.g. `"12 0 R"`.
impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// Parses `"<number> <generation>"` with an optional trailing `R`.
impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_ascii_whitespace();
        let (Some(number), Some(generation)) = (parts.next(), parts.next()) else {
            return Err(TypeError::MalformedIdentity(s.to_string()));
        };
        match (parts.next(), parts.next()) {
            (None, None) | (Some("R"), None) => {}
            _ => return Err(TypeError::MalformedIdentity(s.to_string())),
        }
        let number = number
            .parse::<u32>()
            .map_err(|_| TypeError::InvalidNumber(number.to_string()))?;
        let generation = generation
            .parse::<u16>()
            .map_err(|_| TypeError::InvalidGeneration(generation.to_string()))?;
        Ok(Self::new(number, generation))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn display_parses_back(number in any::<u32>(), generation in any::<u16>()) {
            let id = ObjectId::new(number, generation);
            prop_assert_eq!(id.to_string().parse::<ObjectId>().unwrap(), id);
        }

        #[test]
        fn equality_requires_both_fields(
            n1 in any::<u32>(), n2 in any::<u32>(),
            g1 in any::<u16>(), g2 in any::<u16>()
        ) {
            let a = ObjectId::new(n1, g1);
            let b = ObjectId::new(n2, g2);
            prop_assert_eq!(a == b, n1 == n2 && g1 == g2);
        }
    }
}
