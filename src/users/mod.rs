//! User registration and login

pub mod store;

pub use store::{UserRecord, UserStore};
