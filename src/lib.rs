pub mod config;
pub mod data;
pub mod device;
pub mod error;
pub mod layers;
pub mod math;
pub mod models;
pub mod rng;
pub mod tensor;
