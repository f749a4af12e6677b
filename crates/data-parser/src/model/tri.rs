//! Tri-state optional numerics.
//!
//! The wire protocol reserves per-width sentinel values for "unset" and
//! "unbounded"; natively those are a three-state sum so arithmetic code
//! can never confuse a sentinel with data.

/// A numeric that is either set, unbounded, or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tri<T> {
    Set(T),
    Infinite,
    #[default]
    Unset,
}

pub type TriU16 = Tri<u16>;
pub type TriU32 = Tri<u32>;
pub type TriU64 = Tri<u64>;
pub type TriI64 = Tri<i64>;
pub type TriF64 = Tri<f64>;
pub type TriBool = Tri<bool>;
/// Seconds since the epoch.
pub type TriTime = Tri<i64>;

impl<T> Tri<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Tri::Set(_))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Tri::Infinite)
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Tri::Unset)
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Tri::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Tri::Set(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Copy + Default> Tri<T> {
    /// Value for wire emission: the payload when set, `default` otherwise.
    pub fn or(&self, default: T) -> T {
        match self {
            Tri::Set(v) => *v,
            _ => default,
        }
    }
}

impl<T> From<Option<T>> for Tri<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Tri::Set(v),
            None => Tri::Unset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unset() {
        let t: TriU32 = Tri::default();
        assert!(t.is_unset());
        assert_eq!(t.get(), None);
    }

    #[test]
    fn test_predicates() {
        assert!(Tri::Set(5u16).is_set());
        assert!(TriU64::Infinite.is_infinite());
        assert_eq!(Tri::Set(7u32).or(0), 7);
        assert_eq!(TriU32::Infinite.or(0), 0);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Tri::from(Some(3i64)), Tri::Set(3));
        assert_eq!(Tri::<i64>::from(None), Tri::Unset);
    }
}
