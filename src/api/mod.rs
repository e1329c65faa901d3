pub mod auth;
pub mod branches;
pub mod client;
pub mod filters;
pub mod meest;
