//! Transactional store facade and the nested reconciliation engine.

pub mod event_store;
pub mod reconcile;
