//! Bounded-concurrency dispatch of a fixed request set
//!
//! The dispatcher owns one run's shared state: the pre-loaded request pool,
//! the claim counter and the observation channel. A fixed-size pool of
//! worker tasks drains the requests; the dispatcher collects observations
//! until every worker has finished.
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = DispatcherBuilder::new()
//!     .requests(requests)
//!     .executor(executor)
//!     .concurrency(config.effective_concurrency())
//!     .rate_limit(config.request_rate)
//!     .build()?;
//!
//! let report = dispatcher.run().await?;
//! ```

mod builder;
mod executor;

pub use builder::DispatcherBuilder;
pub use executor::{DispatchReport, Dispatcher};
