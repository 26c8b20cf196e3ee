//! Helper functions for page generation

mod url;

pub use url::*;
