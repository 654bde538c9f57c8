//! `swapi-http` is a resilient async client for the SWAPI catalog.
//!
//! It fronts the upstream's fixed-size pagination and absolute
//! cross-reference URLs with:
//! - [`SwapiClient::get`] / [`SwapiClient::get_by_url`]: one logical GET with
//!   bounded retry/backoff and a four-kind [`SwapiError`] taxonomy; absolute
//!   URL lookups are cached for a fixed TTL
//! - [`SwapiClient::resolve`]: bounded, order-preserving concurrent lookups
//! - [`SwapiClient::window`]: caller-sized pages stitched from upstream pages

mod cache;
mod client;
mod delay;
mod error;
mod fanout;
mod ids;
mod options;
mod params;
mod related;
mod resource;
mod retry;
mod window;
mod wire;

pub use cache::ResponseCache;
pub use client::{SwapiClient, DEFAULT_BASE_URL, UPSTREAM_PAGE_SIZE};
pub use delay::Delay;
pub use error::SwapiError;
pub use ids::{attach_id, extract_id, InvalidSwapiUrl};
pub use options::ClientOptions;
pub use params::QueryParams;
pub use related::filter_by_name;
pub use resource::Resource;
pub use retry::RetryPolicy;
pub use window::{WindowRequest, WindowResult};

pub type Result<T> = std::result::Result<T, SwapiError>;
