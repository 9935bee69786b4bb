//! Game model - chips, players, and the action reducer.
//!
//! This module provides:
//! - Chip denominations and bundles with their monetary value
//! - Player and session state entities
//! - The reducer applying roster, betting and pot actions

pub mod actions;
pub mod chips;
pub mod entities;
pub mod errors;
