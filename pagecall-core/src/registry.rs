use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::error::{self, PageError};
use crate::op::{self, OpSpec};
use crate::page::Slots;

/// Name → operation table.
///
/// Custom operations registered here go through the same checks as the
/// built-in ones.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    ops: HashMap<&'static str, OpSpec>,
}

lazy_static! {
    static ref BUILTIN: Registry = Registry::with_builtins();
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the whole platform catalog.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for spec in op::catalog() {
            registry.register(spec);
        }
        registry
    }

    /// The shared built-in catalog.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Add or replace an operation. Returns the entry it replaced.
    pub fn register(&mut self, spec: OpSpec) -> Option<OpSpec> {
        self.ops.insert(spec.name, spec)
    }

    pub fn get(&self, name: &str) -> Option<&OpSpec> {
        self.ops.get(name)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operation names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.ops.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Operations sorted by name.
    pub fn specs(&self) -> Vec<&OpSpec> {
        let mut specs: Vec<_> = self.ops.values().collect();
        specs.sort_unstable_by_key(|spec| spec.name);
        specs
    }

    /// Look up `name` and dispatch it.
    ///
    /// # Safety
    /// See [`op::Effect`].
    pub unsafe fn invoke(
        &self,
        name: &str,
        page: &mut dyn Slots,
        inputs: &[u64],
        input_count: usize,
    ) -> Result<i64, PageError> {
        let Some(spec) = self.get(name) else {
            log::warn!("unknown operation: {}", name);
            return Err(PageError::UnknownOperation(name.to_string()));
        };
        op::dispatch(spec, page, inputs, input_count)
    }

    /// [`Registry::invoke`] flattened to a 32-bit status.
    ///
    /// # Safety
    /// See [`op::Effect`].
    pub unsafe fn status(
        &self,
        name: &str,
        page: &mut dyn Slots,
        inputs: &[u64],
        input_count: usize,
    ) -> i32 {
        error::status(&self.invoke(name, page, inputs, input_count))
    }
}
