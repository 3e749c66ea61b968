//! Track-side helpers advanced by the host tick.

pub mod decor;

pub use decor::DecorScroller;
