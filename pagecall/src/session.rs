use std::collections::HashMap;
use std::ffi::CString;
use std::time::Instant;

use anyhow::Result;
use pagecall_core::params::{self, ParamError};
use pagecall_core::{OpSpec, PageError, ParamPage, Registry, SlotKind};

use crate::scenario::{quoted, Cmd};

/// Execution state of one test: its page and the strings its current
/// command passes by address.
///
/// Handles still on the page when the session is dropped are released.
pub struct Session {
    page: ParamPage,
    registry: &'static Registry,
    strings: Vec<CString>,
    /// Length of each live mapping, by slot.
    map_lens: HashMap<usize, u64>,
}

impl Session {
    pub fn new(page_capacity: usize) -> Self {
        Self::with_registry(page_capacity, Registry::builtin())
    }

    pub fn with_registry(page_capacity: usize, registry: &'static Registry) -> Self {
        Self {
            page: ParamPage::with_capacity(page_capacity),
            registry,
            strings: Vec::new(),
            map_lens: HashMap::new(),
        }
    }

    pub fn page(&self) -> &ParamPage {
        &self.page
    }

    /// Run `cmd` and return the operation result.
    ///
    /// Unknown operations and wrong argument counts are returned as the
    /// matching [`PageError`] so scenarios can expect them; other malformed
    /// arguments are an error of the scenario itself.
    pub fn execute(&mut self, cmd: &Cmd) -> Result<Result<i64, PageError>> {
        let registry = self.registry;
        let Some(spec) = registry.get(&cmd.opfunc) else {
            return Ok(Err(PageError::UnknownOperation(cmd.opfunc.clone())));
        };

        let strings = &mut self.strings;
        let bound = params::bind_with(spec, &cmd.args, |_, value| match quoted(value) {
            Some(text) => {
                let text = CString::new(text).ok()?;
                let addr = text.as_ptr() as usize as u64;
                strings.push(text);
                Some(addr)
            }
            None => params::parse_value(value),
        });
        let inputs = match bound {
            Ok(inputs) => inputs,
            Err(ParamError::Count { op, expected, actual }) => {
                self.strings.clear();
                return Ok(Err(PageError::ArityMismatch { op, expected, actual }));
            }
            Err(e) => {
                self.strings.clear();
                return Err(e.into());
            }
        };

        let start = Instant::now();
        // Scenario files are trusted input: handles and addresses they pass
        // are the test author's responsibility.
        let result =
            unsafe { registry.invoke(&cmd.opfunc, &mut self.page, &inputs, inputs.len()) };
        if cmd.perf {
            log::info!("cmd '{}' executed cost {:?}", cmd.opfunc, start.elapsed());
        }

        self.strings.clear();
        if result.is_ok() {
            self.track_mapping(spec, &inputs);
        }
        Ok(result)
    }

    fn track_mapping(&mut self, spec: &OpSpec, inputs: &[u64]) {
        let input = |name: &str| {
            spec.params
                .iter()
                .position(|p| p.name == name)
                .and_then(|i| inputs.get(i).copied())
        };
        match spec.name {
            "map" => {
                if let (Some(slot), Some(len)) = (input("out_idx"), input("len")) {
                    self.map_lens.insert(slot as usize, len);
                }
            }
            "unmap" => {
                if let Some(slot) = input("map_idx") {
                    self.map_lens.remove(&(slot as usize));
                }
            }
            _ => {}
        }
    }

    /// Release every heap block, descriptor and mapping left on the page.
    ///
    /// Returns the slots that could not be released; they are also logged.
    pub fn release_handles(&mut self) -> Vec<usize> {
        let registry = self.registry;
        let mut leaked = Vec::new();
        for slot in 0..self.page.as_slice().len() {
            let index = slot as u64;
            let result = match self.page.slot_kind(slot) {
                Some(SlotKind::Pointer) => unsafe {
                    registry.invoke("release", &mut self.page, &[index], 1)
                },
                Some(SlotKind::Descriptor) => unsafe {
                    registry.invoke("close", &mut self.page, &[index], 1)
                },
                Some(SlotKind::Mapping) => match self.map_lens.remove(&slot) {
                    Some(len) => unsafe {
                        registry.invoke("unmap", &mut self.page, &[index, len], 2)
                    },
                    None => {
                        log::warn!("slot {} holds a mapping of unknown length", slot);
                        leaked.push(slot);
                        continue;
                    }
                },
                _ => continue,
            };
            if let Err(e) = result {
                log::warn!("slot {} could not be released: {}", slot, e);
                leaked.push(slot);
            }
        }
        if !leaked.is_empty() {
            log::warn!("leaked handles in slots {:?}", leaked);
        }
        leaked
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release_handles();
    }
}

/// Status of a result as compared against expectations.
pub fn status_of(result: &Result<i64, PageError>) -> i64 {
    match result {
        Ok(v) => *v,
        Err(e) => i64::from(e.code()),
    }
}
