mod auth;
mod balance;
mod orders;
