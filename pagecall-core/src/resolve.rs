//! Addressing resolver.
//!
//! Turns the raw input integers of a call into operands according to the
//! addressing mode each parameter declares. All range checks run before any
//! null check, and all null checks before any kind check, so the first
//! failure reported is always the highest-precedence one.

use crate::error::PageError;
use crate::page::{SlotKind, Slots};
use crate::trace;

/// How an input integer is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The integer is the operand.
    Value,
    /// The integer is a slot index that receives an output.
    Absolute,
    /// The integer is a slot index whose stored value is the operand.
    Relative { non_null: bool },
}

/// What an operand is reinterpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Integer,
    /// Readable/writable memory: heap blocks or mappings.
    Memory,
    /// Heap block from the platform allocator only.
    Pointer,
    Descriptor,
    Mapping,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Integer => "integer",
            Kind::Memory => "memory",
            Kind::Pointer => "pointer",
            Kind::Descriptor => "descriptor",
            Kind::Mapping => "mapping",
        }
    }

    /// Whether a slot tagged `slot` may be consumed as this kind.
    pub fn accepts(self, slot: SlotKind) -> bool {
        match (self, slot) {
            (_, SlotKind::Empty) => true,
            (Kind::Integer, SlotKind::Integer) => true,
            (Kind::Memory, SlotKind::Pointer | SlotKind::Mapping) => true,
            (Kind::Pointer, SlotKind::Pointer) => true,
            (Kind::Descriptor, SlotKind::Descriptor) => true,
            (Kind::Mapping, SlotKind::Mapping) => true,
            _ => false,
        }
    }
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub mode: Mode,
    pub kind: Kind,
}

impl Param {
    pub const fn value(name: &'static str) -> Self {
        Self { name, mode: Mode::Value, kind: Kind::Integer }
    }

    pub const fn output(name: &'static str, kind: Kind) -> Self {
        Self { name, mode: Mode::Absolute, kind }
    }

    /// Relative input that must resolve to a non-zero handle.
    pub const fn handle(name: &'static str, kind: Kind) -> Self {
        Self { name, mode: Mode::Relative { non_null: true }, kind }
    }

    /// Relative input that may resolve to zero.
    pub const fn nullable(name: &'static str, kind: Kind) -> Self {
        Self { name, mode: Mode::Relative { non_null: false }, kind }
    }

    fn addresses_slot(&self) -> bool {
        !matches!(self.mode, Mode::Value)
    }
}

/// A resolved input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Value(u64),
    Output(usize),
    Handle { index: usize, value: u64 },
}

/// Resolve `inputs` against `params`. The caller has already checked arity.
pub fn resolve(
    op: &'static str,
    params: &[Param],
    inputs: &[u64],
    page: &dyn Slots,
) -> Result<Vec<Operand>, PageError> {
    let capacity = page.capacity();

    for (param, &raw) in params.iter().zip(inputs) {
        if param.addresses_slot() && raw >= capacity as u64 {
            return Err(PageError::OutOfRange {
                op,
                param: param.name,
                index: raw,
                capacity,
            });
        }
    }

    for (param, &raw) in params.iter().zip(inputs) {
        if let Mode::Relative { non_null: true } = param.mode {
            let index = raw as usize;
            if page.load(index) == 0 {
                return Err(PageError::NullHandle { op, param: param.name, index });
            }
        }
    }

    for (param, &raw) in params.iter().zip(inputs) {
        if let Mode::Relative { .. } = param.mode {
            let index = raw as usize;
            let Some(found) = page.kind(index) else {
                continue;
            };
            if !param.kind.accepts(found) {
                return Err(PageError::TypeMismatch {
                    op,
                    param: param.name,
                    index,
                    expected: param.kind.name(),
                    found,
                });
            }
        }
    }

    let operands: Vec<Operand> = params
        .iter()
        .zip(inputs)
        .map(|(param, &raw)| match param.mode {
            Mode::Value => Operand::Value(raw),
            Mode::Absolute => Operand::Output(raw as usize),
            Mode::Relative { .. } => {
                let index = raw as usize;
                Operand::Handle { index, value: page.load(index) }
            }
        })
        .collect();

    trace::resolve(format_args!("{op}: resolved {operands:?}"));
    Ok(operands)
}
