//! API handlers.

pub mod access;
pub mod admin;
pub mod auth;
pub mod companies;
pub mod events;
pub mod health;
pub mod project_types;
pub mod projects;
pub mod roles;
pub mod sites;
pub mod users;
