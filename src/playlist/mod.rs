pub mod classic;
pub mod config;
pub mod context;
pub mod dedup;
pub mod generator;
pub mod interval;
pub mod metadata;
pub mod profile;
pub mod relax;
pub mod schedule;
pub mod search;
pub mod seeds;
pub mod steady;
pub mod utils;
pub mod window;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod search_tests;
#[cfg(test)]
pub(crate) mod test_support;

pub use config::*;
pub use generator::*;
pub use metadata::*;
