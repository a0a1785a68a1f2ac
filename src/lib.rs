//! Vaccination centre directory built on the Vite Ma Dose open data feed.
pub mod clients;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod repo;
pub mod routes;
pub mod services;
pub mod utils;
