//! Client (tenant) management for Marka
//!
//! Clients group users and websites for access control purposes. The
//! plugin exposes CRUD endpoints plus association management between
//! clients, users, and websites.

pub mod audit;
pub mod handlers;
pub mod plugin;
pub mod service;

pub use audit::*;
pub use handlers::{ClientApiDoc, ClientState};
pub use plugin::ClientsPlugin;
pub use service::{
    ClientResponse, ClientService, CreateClientRequest, UpdateClientRequest, DESCRIPTION_MAX_LEN,
    TITLE_MAX_LEN, TITLE_MIN_LEN,
};
