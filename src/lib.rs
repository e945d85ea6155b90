pub mod http_client;
pub mod layout;
pub mod provider;
pub mod squad_fetch;
pub mod state;
