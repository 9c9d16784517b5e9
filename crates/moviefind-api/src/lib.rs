//! API client library for moviefind.
//!
//! Provides clients for the TMDB API and the Appwrite document store
//! that records search popularity.

/// Appwrite document store client (search popularity metrics).
pub mod appwrite;

/// TMDB API client.
pub mod tmdb;
