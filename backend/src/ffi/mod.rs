//! Python bindings (feature `pyo3`)
//!
//! JSON in, JSON out: the Python side works with the same snapshot documents
//! the archive and mirror use.

pub mod stand;
