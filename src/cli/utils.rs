//! Utility functions for CLI operations

pub mod action_utils;
pub mod messages;
