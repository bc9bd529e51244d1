pub mod activity;
pub mod auth;
pub mod cli;
pub mod contrib;
pub mod error;
pub mod export;
pub mod github;
pub mod logging;
pub mod model;
pub mod prompt;
pub mod source;
pub mod util;
