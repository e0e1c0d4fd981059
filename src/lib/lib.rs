pub mod adapters;
pub mod client;
pub mod config;
pub mod core;
pub mod storage;

#[cfg(test)]
mod tests;
