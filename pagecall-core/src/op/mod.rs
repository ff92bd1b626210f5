//! Operation descriptors and the generic dispatcher.
//!
//! Every primitive is declared as an [`OpSpec`]: a name, an ordered parameter
//! list and an effect. [`dispatch`] runs the shared checks (arity, range,
//! null, kind) and only then hands the resolved operands to the effect.

pub mod memory;
pub mod string;

#[cfg(unix)]
pub mod fd;
#[cfg(unix)]
pub mod mmap;

use crate::error::PageError;
use crate::page::{SlotKind, Slots};
use crate::resolve::{self, Operand, Param};
use crate::trace;

/// Body of an operation.
///
/// # Safety
/// Effects dereference handles and pointer-valued inputs. The caller must
/// guarantee they refer to live memory, descriptors or mappings of the size
/// the operation touches.
pub type Effect = unsafe fn(&mut Call<'_>) -> Result<i64, PageError>;

/// A catalog entry.
#[derive(Clone, Copy)]
pub struct OpSpec {
    pub name: &'static str,
    pub params: &'static [Param],
    pub effect: Effect,
}

impl OpSpec {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl std::fmt::Debug for OpSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// What an effect sees: its resolved operands and the page to write back to.
pub struct Call<'a> {
    op: &'static str,
    page: &'a mut dyn Slots,
    operands: Vec<Operand>,
}

impl Call<'_> {
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// Operand `i` as a plain number (value inputs and handle values alike).
    pub fn value(&self, i: usize) -> u64 {
        match self.operands[i] {
            Operand::Value(v) => v,
            Operand::Handle { value, .. } => value,
            Operand::Output(index) => index as u64,
        }
    }

    pub fn ptr(&self, i: usize) -> *mut u8 {
        self.value(i) as usize as *mut u8
    }

    /// Write `value` to the output slot named by operand `i`.
    pub fn emit(&mut self, i: usize, value: u64, kind: SlotKind) {
        if let Operand::Output(index) = self.operands[i] {
            self.page.store(index, value, kind);
        }
    }

    /// Zero the slot operand `i` was read from.
    pub fn invalidate(&mut self, i: usize) {
        if let Operand::Handle { index, .. } = self.operands[i] {
            self.page.store(index, 0, SlotKind::Empty);
        }
    }
}

/// Run one operation against `page`.
///
/// `input_count` is the number of inputs the host claims to pass; it must
/// equal the operation's arity and must not exceed `inputs.len()`.
///
/// # Safety
/// See [`Effect`].
pub unsafe fn dispatch(
    spec: &OpSpec,
    page: &mut dyn Slots,
    inputs: &[u64],
    input_count: usize,
) -> Result<i64, PageError> {
    let result = dispatch_inner(spec, page, inputs, input_count);
    match &result {
        Ok(v) => trace::dispatch(format_args!("{}{:?} -> {}", spec.name, inputs, v)),
        Err(e) => log::warn!("{}", e),
    }
    result
}

unsafe fn dispatch_inner(
    spec: &OpSpec,
    page: &mut dyn Slots,
    inputs: &[u64],
    input_count: usize,
) -> Result<i64, PageError> {
    if input_count != spec.arity() || inputs.len() < input_count {
        return Err(PageError::ArityMismatch {
            op: spec.name,
            expected: spec.arity(),
            actual: input_count,
        });
    }

    let inputs = &inputs[..input_count];
    let operands = resolve::resolve(spec.name, spec.params, inputs, page)?;
    let mut call = Call { op: spec.name, page, operands };
    (spec.effect)(&mut call)
}

/// Every built-in operation available on this platform.
pub fn catalog() -> Vec<OpSpec> {
    let mut ops = Vec::new();
    ops.extend_from_slice(memory::OPS);
    ops.extend_from_slice(string::OPS);
    #[cfg(unix)]
    {
        ops.extend_from_slice(fd::OPS);
        ops.extend_from_slice(mmap::OPS);
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ParamPage;
    use crate::resolve::Kind;
    use pretty_assertions::assert_eq;

    unsafe fn store_sum(call: &mut Call<'_>) -> Result<i64, PageError> {
        let sum = call.value(0) + call.value(1);
        call.emit(2, sum, SlotKind::Integer);
        Ok(sum as i64)
    }

    const SUM: OpSpec = OpSpec {
        name: "sum",
        params: &[
            Param::handle("lhs_idx", Kind::Integer),
            Param::value("rhs"),
            Param::output("out_idx", Kind::Integer),
        ],
        effect: store_sum,
    };

    #[test]
    fn dispatch_runs_effect() {
        let mut page = ParamPage::new();
        page.set(1, 40);
        let r = unsafe { dispatch(&SUM, &mut page, &[1, 2, 3], 3) };
        assert_eq!(r, Ok(42));
        assert_eq!(page.get(3), Some(42));
        assert_eq!(page.slot_kind(3), Some(SlotKind::Integer));
    }

    #[test]
    fn arity_is_checked_first() {
        let mut page = ParamPage::new();
        // also out of range, but arity wins
        let r = unsafe { dispatch(&SUM, &mut page, &[1000, 2], 2) };
        assert_eq!(r, Err(PageError::ArityMismatch { op: "sum", expected: 3, actual: 2 }));
    }

    #[test]
    fn claimed_count_longer_than_inputs() {
        let mut page = ParamPage::new();
        let r = unsafe { dispatch(&SUM, &mut page, &[1, 2], 3) };
        assert!(matches!(r, Err(PageError::ArityMismatch { .. })));
    }

    #[test]
    fn extra_inputs_beyond_count_are_ignored() {
        let mut page = ParamPage::new();
        page.set(1, 1);
        let r = unsafe { dispatch(&SUM, &mut page, &[1, 2, 3, 99], 3) };
        assert_eq!(r, Ok(3));
    }

    #[test]
    fn failed_checks_leave_page_untouched() {
        let mut page = ParamPage::new();
        page.set(3, 5);
        let before = page.as_slice().to_vec();
        let r = unsafe { dispatch(&SUM, &mut page, &[1, 2, 3], 3) };
        assert!(matches!(r, Err(PageError::NullHandle { .. })));
        assert_eq!(page.as_slice(), before.as_slice());
    }

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<&str> = catalog().iter().map(|op| op.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
