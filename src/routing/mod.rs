//! Routing module
//!
//! The fixed route table of the article server and its path matcher.

mod matcher;

pub use matcher::{match_pattern, match_route, Route, RouteMatch};
