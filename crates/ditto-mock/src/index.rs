//! Per-method index of mocks.
//!
//! Each method owns an ordered bucket. Merging appends in presentation order
//! and never deduplicates, so the first mock merged for a method is the first
//! one tried at match time.

use crate::mock::DittoMock;
use crate::predicate::CompiledRequestPattern;
use std::collections::HashMap;

/// A mock together with its compiled request pattern.
#[derive(Debug)]
pub struct CompiledMock {
    pub mock: DittoMock,
    pub pattern: CompiledRequestPattern,
}

impl CompiledMock {
    pub fn compile(mock: DittoMock) -> Self {
        let pattern = CompiledRequestPattern::compile(&mock.request);
        CompiledMock { mock, pattern }
    }

    pub fn method(&self) -> &str {
        &self.mock.request.method
    }
}

/// Method name → ordered bucket of mocks.
#[derive(Debug, Default)]
pub struct MockIndex {
    buckets: HashMap<String, Vec<CompiledMock>>,
    /// Methods in order of first appearance
    methods: Vec<String>,
}

impl MockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `mocks` to their method buckets, creating buckets as needed.
    pub fn merge(&mut self, mocks: impl IntoIterator<Item = DittoMock>) {
        for mock in mocks {
            let compiled = CompiledMock::compile(mock);
            match self.buckets.get_mut(compiled.method()) {
                Some(bucket) => bucket.push(compiled),
                None => {
                    self.methods.push(compiled.method().to_string());
                    self.buckets
                        .insert(compiled.method().to_string(), vec![compiled]);
                }
            }
        }
    }

    pub fn bucket(&self, method: &str) -> Option<&[CompiledMock]> {
        self.buckets.get(method).map(Vec::as_slice)
    }

    /// Method names in order of first appearance.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(String::as_str)
    }

    /// All mocks, grouped by method in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledMock> {
        self.methods
            .iter()
            .filter_map(|m| self.buckets.get(m))
            .flatten()
    }

    /// Total number of mocks.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
