pub mod backend;
pub mod config;
pub mod dashboard;
pub mod map;
pub mod output;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
