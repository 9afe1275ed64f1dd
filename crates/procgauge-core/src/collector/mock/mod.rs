//! In-memory `/proc` fixtures for tests.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
