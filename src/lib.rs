pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod parser;
pub mod record;
pub mod retry;
pub mod runner;

pub use error::{FetchError, ParseError};
pub use parser::extract_profile;
pub use record::{Education, Experience, ProfileRecord};
