pub mod error;
pub mod security;
