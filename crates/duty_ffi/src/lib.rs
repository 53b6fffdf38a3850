//! Mobile host bindings for the Duty Manager note core.

pub mod api;
