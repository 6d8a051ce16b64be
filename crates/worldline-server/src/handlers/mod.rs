//! Request handlers and wire representations.

pub mod events;
