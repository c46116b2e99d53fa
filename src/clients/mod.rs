pub mod error;
pub mod fitness;
pub mod models;

#[cfg(test)]
pub mod stub;
