//! HTTP handlers, organized by domain:
//! - `items` — catalog CRUD and the client⇄storage item mapping
//! - `profile` — two-store profile projection
//! - `social` — likes, wishlist, comments, and the public listing annotation
//! - `upload` — image upload gateway

pub mod items;
pub mod profile;
pub mod social;
pub mod upload;
