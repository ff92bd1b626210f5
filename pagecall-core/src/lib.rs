//! Parameter-page calling convention.
//!
//! A host that can only pass integers drives native memory, string,
//! descriptor and mapping primitives through a shared page of 64-bit slots.
//! Each call names an operation and hands over a fixed number of inputs;
//! every input is either a plain value, the index of a slot that receives an
//! output, or the index of a slot whose stored value is the operand.
//!
//! ```no_run
//! use pagecall_core::{ParamPage, Registry};
//!
//! let mut page = ParamPage::new();
//! let ops = Registry::builtin();
//! unsafe {
//!     ops.invoke("allocate", &mut page, &[64, 5], 2).unwrap();
//!     ops.invoke("write64", &mut page, &[5, 0, 0xDEADBEEF], 3).unwrap();
//!     assert_eq!(ops.invoke("read64", &mut page, &[5, 0], 2), Ok(0xDEADBEEF));
//!     ops.invoke("release", &mut page, &[5], 1).unwrap();
//! }
//! ```

pub mod abi;
pub mod error;
pub mod op;
pub mod page;
pub mod params;
pub mod registry;
pub mod resolve;
pub mod trace;

pub use error::{status, PageError};
pub use op::{dispatch, Call, OpSpec};
pub use page::{ParamPage, RawPage, SlotKind, Slots, PAGE_CAPACITY};
pub use params::{bind_named, parse_value, ParamError};
pub use registry::Registry;
pub use resolve::{Kind, Mode, Param};
