//! Integration tests: data source -> engine -> storage -> dashboard.

mod mock_source;
mod pipeline;
