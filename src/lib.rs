pub mod booth_url;
pub mod columns;
pub mod normalize;
pub mod stats;
pub mod aggregate;
pub mod source;
pub mod snapshot;
pub mod serve;
pub mod pipeline;
pub mod config;
pub mod logging;
