// # Desired State Implementations
//
// This module provides implementations of the DesiredState trait for
// different ways of declaring zones.

pub mod file;
pub mod memory;

pub use file::{DesiredFileFormat, FileDesiredState};
pub use memory::StaticDesiredState;
