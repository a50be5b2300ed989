pub mod auth_handlers;
pub mod jwt;
pub mod password;
