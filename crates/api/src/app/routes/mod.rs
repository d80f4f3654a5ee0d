pub mod actors;
pub mod admin;
pub mod common;
pub mod movies;
pub mod ratings;
pub mod reviews;
pub mod system;
