//! # Bonus points server
//! This crate hosts the HTTP server of the loyalty points system. It is responsible for:
//! * Registering and logging in users, and issuing their access tokens.
//! * Accepting purchase order numbers from users and listing them back with their status.
//! * Reporting balances and accepting withdrawals.
//! * Running the accrual poller, which asks the external accrual service about pending orders and credits users once
//!   an order has been processed.
//!
//! ## Configuration
//! The server is configured via environment variables and command-line flags. See [config](config/index.html) for
//! more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/user/register`, `/api/user/login`: Create an account or log in. Both return an access token.
//! * `/api/user/orders`: Submit (`POST`) and list (`GET`) order numbers.
//! * `/api/user/balance`, `/api/user/balance/withdraw`, `/api/user/withdrawals`: Balance and withdrawals.
//!
//! Every `/api/user` route other than register and login requires a valid access token, supplied either as the
//! `token` cookie or as an `Authorization: Bearer` header.
pub mod accrual_worker;
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
