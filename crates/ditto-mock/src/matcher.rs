//! RequestMatcher: builds the mock index and answers match requests.

use crate::config::MatcherConfig;
use crate::error::{EvalError, LoadError, NotMatched};
use crate::index::MockIndex;
use crate::loader::{DefinitionSource, DirectorySource, DEFAULT_EXTENSION};
use crate::logger::{Logger, TracingLogger};
use crate::mock::{DittoMock, DittoResponse};
use crate::predicate::Payload;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Outcome of evaluating one mock, as reported by [`RequestMatcher::explain`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockVerdict {
    /// Position of the mock within its method bucket
    pub index: usize,
    pub result: Result<bool, EvalError>,
}

/// Matches incoming requests against loaded mocks.
///
/// Immutable once built; share it behind an `Arc` for concurrent use.
#[derive(Debug)]
pub struct RequestMatcher {
    index: MockIndex,
    logger: Arc<dyn Logger>,
}

impl RequestMatcher {
    pub fn builder() -> RequestMatcherBuilder {
        RequestMatcherBuilder::default()
    }

    /// Build a matcher from configuration.
    pub fn from_config(config: &MatcherConfig) -> Result<Self, LoadError> {
        let mut builder = Self::builder().extension(&config.extension);
        if let Some(path) = &config.mocks_path {
            builder = builder.mocks_path(path);
        }
        builder.build()
    }

    /// Find the first mock for `method` whose request pattern accepts
    /// `payload` and return its response.
    ///
    /// Mocks that fail to evaluate are logged and skipped.
    pub fn match_request(&self, method: &str, payload: &[u8]) -> Result<&DittoResponse, NotMatched> {
        let not_matched = || NotMatched {
            method: method.to_string(),
        };

        let bucket = self.index.bucket(method).ok_or_else(not_matched)?;
        let payload = Payload::new(payload);

        for compiled in bucket {
            match compiled.pattern.evaluate(&payload) {
                Ok(true) => return Ok(&compiled.mock.response),
                Ok(false) => {}
                Err(err) => self.logger.warn("matching error", &err),
            }
        }

        Err(not_matched())
    }

    /// Evaluate every mock registered for `method` without stopping at the
    /// first match and without logging.
    pub fn explain(&self, method: &str, payload: &[u8]) -> Vec<MockVerdict> {
        let payload = Payload::new(payload);
        self.index
            .bucket(method)
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(index, compiled)| MockVerdict {
                index,
                result: compiled.pattern.evaluate(&payload),
            })
            .collect()
    }

    /// Registered method names, in order of first appearance.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.index.methods()
    }

    /// Mocks registered for `method`, in match order.
    pub fn mocks_for(&self, method: &str) -> impl Iterator<Item = &DittoMock> {
        self.index
            .bucket(method)
            .unwrap_or_default()
            .iter()
            .map(|compiled| &compiled.mock)
    }

    /// All mocks, grouped by method.
    pub fn mocks(&self) -> impl Iterator<Item = &DittoMock> {
        self.index.iter().map(|compiled| &compiled.mock)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Builder for [`RequestMatcher`]. Every input is optional.
#[derive(Default)]
pub struct RequestMatcherBuilder {
    mocks_path: Option<PathBuf>,
    extension: Option<String>,
    logger: Option<Arc<dyn Logger>>,
    mocks: Vec<DittoMock>,
    sources: Vec<Box<dyn DefinitionSource>>,
}

impl RequestMatcherBuilder {
    /// Root directory (or single file) to discover definition files from.
    pub fn mocks_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mocks_path = Some(path.into());
        self
    }

    /// Extension of definition files under `mocks_path` (default `json`).
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Seed the index with in-memory mocks. Replaces previously seeded mocks.
    pub fn mocks(mut self, mocks: Vec<DittoMock>) -> Self {
        self.mocks = mocks;
        self
    }

    /// Additional definition source, merged after `mocks_path`.
    pub fn source(mut self, source: impl DefinitionSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Load every definition and build the matcher.
    ///
    /// Seeded mocks come first, then the documents under `mocks_path` in
    /// traversal order, then extra sources. Any load error aborts the build.
    pub fn build(self) -> Result<RequestMatcher, LoadError> {
        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(TracingLogger) as Arc<dyn Logger>);
        let mut index = MockIndex::new();
        index.merge(self.mocks);

        let mut sources = self.sources;
        if let Some(root) = self.mocks_path {
            let directory = DirectorySource::new(root)
                .with_extension(self.extension.as_deref().unwrap_or(DEFAULT_EXTENSION));
            sources.insert(0, Box::new(directory));
        }

        for source in &sources {
            for document in source.documents()? {
                let mocks = document.load()?;
                logger.debug(&format!(
                    "Loaded {} mock(s) from {}",
                    mocks.len(),
                    document.origin
                ));
                index.merge(mocks);
            }
        }

        for compiled in index.iter() {
            for query in compiled.pattern.invalid_queries() {
                logger.warn(
                    &format!(
                        "mock for {} has an invalid JSONPath expression and will never match",
                        compiled.method()
                    ),
                    &EvalError::JsonPath {
                        expression: query.expression().to_string(),
                        reason: query.parse_error().unwrap_or_default().to_string(),
                    },
                );
            }
        }

        info!(
            "Request matcher ready: {} mock(s) across {} method(s)",
            index.len(),
            index.methods().count()
        );

        Ok(RequestMatcher { index, logger })
    }
}
