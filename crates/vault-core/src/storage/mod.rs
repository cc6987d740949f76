//! Storage backends for users and achievements
//!
//! This module provides:
//! 1. In-memory storage
//! 2. JSON file storage (persistent)
//! 3. An encrypting decorator over either of them

mod encrypted;
mod json_file;
mod memory;
mod tables;
mod traits;

pub use encrypted::EncryptedStorage;
pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;
pub use traits::Storage;
