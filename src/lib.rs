//! Page Dispatch Library
//!
//! Request-routing and dispatch core for server-rendered pages: ordered rule matching,
//! handler pipelines with interceptors, failure-to-page mapping and pluggable writers.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod http;
pub mod observability;
pub mod outcome;
pub mod routing;
pub mod template;
pub mod writer;

pub use config::schema::AppConfig;
pub use dispatch::Dispatcher;
pub use error::{ConfigurationError, DispatchError, WriterError};
pub use handler::{Handler, HandlerContext, HandlerDeclaration};
pub use http::HttpServer;
pub use outcome::{Failure, FailureKind, Outcome, ResponseDescriptor};
pub use routing::{RuleTable, RuleTableBuilder};
