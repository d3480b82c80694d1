//! Ignite Core
//!
//! Core types shared by the ignite client and CLI.
//!
//! This crate contains:
//! - Domain types: instance references and states, retry policy, attempt results and run outcomes

pub mod domain;
