pub mod client;

pub use client::{domain_search_url, parse_domain_search, HunterClient, DEFAULT_BASE_URL};
