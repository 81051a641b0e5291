//! CLI infrastructure for the chopsticks solver
//!
//! This module provides the command-line interface for solving positions,
//! answering single-position queries and playing the engine against a
//! random opponent.

pub mod commands;
pub mod config;
pub mod output;
