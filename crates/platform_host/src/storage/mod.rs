//! Persistence contracts: raw preference storage and the tool registry built on it.

pub mod prefs;
pub mod tools;
