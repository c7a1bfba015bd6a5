pub mod cancel;
pub mod defaults;
pub mod error;
pub mod repo;
pub mod resolver;
pub mod service;
pub mod writer;

#[cfg(test)]
mod service_test;
