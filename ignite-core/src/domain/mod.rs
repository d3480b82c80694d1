//! Core domain types
//!
//! These types describe one invocation of the instance starter: what is being
//! started, how hard to try, and how it ended.

pub mod instance;
pub mod outcome;
pub mod policy;
