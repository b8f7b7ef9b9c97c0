//! Sealed trait marker for Transport implementations.
//!
//! Prevents implementations of `Transport` outside this crate.

pub(crate) mod private {
    /// Sealed trait marker.
    pub trait Sealed {}
}
