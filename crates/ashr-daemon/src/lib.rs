pub mod api_types;
pub mod market;
pub mod routes;
pub mod state;
