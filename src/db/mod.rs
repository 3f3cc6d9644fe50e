//! Persistent store for users, provider linkages, and revoked credentials.

pub mod store;

pub use store::Store;
