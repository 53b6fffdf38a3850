//! Use-case orchestration.
//!
//! # Responsibility
//! - Turn user intents into store writes followed by list updates.
//! - Keep surfaces decoupled from storage details.

pub mod note_controller;
