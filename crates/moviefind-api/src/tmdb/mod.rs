//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 movie endpoints.

mod api;
mod client;
mod rate_limiter;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    DiscoverMovieParams, MOVIE_PAGE_BASE_URL, POSTER_BASE_URL, SearchMovieParams, TmdbMovie,
    TmdbMovieListResponse,
};
