//! Ditto: declarative mock matching for RPC-style test doubles.
//!
//! Mock definitions are JSON documents pairing a request pattern with a canned
//! response. A [`RequestMatcher`] indexes them by method name and, for each
//! incoming `(method, payload)` pair, returns the response of the first mock
//! whose body patterns accept the payload.
//!
//! # Example
//!
//! ```no_run
//! use ditto_mock::RequestMatcher;
//!
//! let matcher = RequestMatcher::builder()
//!     .mocks_path("./mocks")
//!     .build()
//!     .expect("mock definitions should load");
//!
//! match matcher.match_request("greet.Greeter/SayHello", br#"{"name":"ditto"}"#) {
//!     Ok(response) => println!("{}", response.as_value()),
//!     Err(not_matched) => eprintln!("{not_matched}"),
//! }
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod lint;
pub mod loader;
pub mod logger;
pub mod matcher;
pub mod mock;
pub mod predicate;

pub use config::{LogConfig, LogFormat, MatcherConfig};
pub use error::{ConfigError, EvalError, LoadError, NotMatched};
pub use loader::{DefinitionSource, DirectorySource, MockDocument, SourceDocument};
pub use logger::{Logger, TracingLogger};
pub use matcher::{MockVerdict, RequestMatcher, RequestMatcherBuilder};
pub use mock::{BodyPattern, DittoMock, DittoRequest, DittoResponse, JsonPathMode, JsonPathPattern};
