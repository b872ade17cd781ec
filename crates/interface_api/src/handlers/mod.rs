//! Request handlers

pub mod customer;
pub mod health;
pub mod order;
pub mod product;
pub mod summary;
