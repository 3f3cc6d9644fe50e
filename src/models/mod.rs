//! Data models.

pub mod user;

pub use user::{Provider, SocialAccount, SocialAccountProfile, User, UserProfile};
