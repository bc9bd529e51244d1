pub mod client;
pub mod fetch;

pub use client::{ClientConfig, Credentials, GitHubClient, DEFAULT_API_URL};
pub use fetch::{fetch_all_details, fetch_details};
