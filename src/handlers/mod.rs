pub mod auth;
pub mod offers;
pub mod workspaces;
