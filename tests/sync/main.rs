//! Integration tests for the inventory sync layer against the in-memory gateway.

mod support;

mod mutations;
mod pagination;
mod stock;
