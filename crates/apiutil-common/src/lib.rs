//! Shared building blocks for the apiutil crates.
//!
//! - [`logging`]: the two-level [`Logger`](logging::Logger) used by the client
//!   core and the process-wide `tracing` sink configuration.
//! - [`query`]: query-string collection and the reserved-key helpers the
//!   remote service understands (limit, scope, order_by, attribute filters...).
//! - [`convert`]: newtypes for the service's string-encoded timestamps and
//!   booleans.

pub mod convert;
pub mod logging;
pub mod query;

pub use convert::{ApiBool, ApiTime};
pub use logging::{init_logging, LogFormat, LogOutput, LogSettings, Logger, LoggingError, TracingLogger};
pub use query::{AttrArgs, AttrQuery, Combinator, Operator, OrderDir, Query, Scope};
