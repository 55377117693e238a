//! Item-item collaborative-filtering movie recommender
//!
//! A ratings relation is pivoted into an item-user matrix once, turned into a
//! cosine similarity matrix, and then queried with free-text titles. The HTTP
//! layer in [`api`] serves the model built by [`data::load_or_build`].

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
