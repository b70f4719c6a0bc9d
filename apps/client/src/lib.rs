//! Client layer of the career recommendation app: auth forms, the dashboard,
//! the landing page and the shared app shell, driven against an abstract
//! document and HTTP transport.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod dom;
pub mod errors;
pub mod http;
pub mod landing;
pub mod shell;

pub use config::Config;
pub use errors::ClientError;
