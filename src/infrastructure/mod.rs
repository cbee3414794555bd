pub mod client;
pub mod stability;
