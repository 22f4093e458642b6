//! # Cookbook Core
//!
//! Shared, I/O-free logic for the cookbook registry: categories and entry
//! models, notebook parsing and content extraction, and the link templates
//! that point readers at Colab and GitHub.
//!
//! This crate performs no filesystem access and pulls in no async runtime.
//! Reading `registry.yaml` and notebook files is the job of the
//! `cookbook-registry` crate, which feeds text into the types defined here.

pub mod links;
pub mod models;
pub mod notebook;
