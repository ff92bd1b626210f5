//! C entry points.
//!
//! Every catalog operation is exported as
//! `int Call_<name>(uint64_t *param_page, const uint64_t *params, int params_len)`.
//! `param_page` must point at [`PAGE_CAPACITY`] slots. The page is untagged on
//! this path, so no kind checks are made. Results wider than 32 bits keep
//! only their low half.

use std::os::raw::c_int;

use crate::error::{self, code};
use crate::op;
use crate::page::{RawPage, PAGE_CAPACITY};
use crate::registry::Registry;

/// Shared body of the exported functions.
///
/// # Safety
/// `param_page` must be null or valid for [`PAGE_CAPACITY`] slots; `params`
/// must be valid for `params_len` values when the count matches the arity.
pub unsafe fn call_raw(
    name: &str,
    param_page: *mut u64,
    params: *const u64,
    params_len: c_int,
) -> c_int {
    if param_page.is_null() {
        log::warn!("[{}] got null param page", name);
        return code::NULL_HANDLE;
    }
    let Ok(count) = usize::try_from(params_len) else {
        log::warn!("[{}] negative params len {}", name, params_len);
        return code::ARITY_MISMATCH;
    };
    let Some(spec) = Registry::builtin().get(name) else {
        return code::UNKNOWN_OPERATION;
    };
    if count > 0 && count == spec.arity() && params.is_null() {
        log::warn!("[{}] got null params", name);
        return code::NULL_HANDLE;
    }

    // the host only vouches for `params` when the count is right
    let inputs: &[u64] = if count == spec.arity() && count > 0 {
        std::slice::from_raw_parts(params, count)
    } else {
        &[]
    };
    let slots = std::slice::from_raw_parts_mut(param_page, PAGE_CAPACITY);
    let mut page = RawPage::new(slots);
    error::status(&op::dispatch(spec, &mut page, inputs, count))
}

macro_rules! export {
    ($($sym:ident => $name:literal),* $(,)?) => {
        $(
            #[doc = concat!("C entry point for `", $name, "`.")]
            ///
            /// # Safety
            /// See [`call_raw`].
            #[no_mangle]
            #[allow(non_snake_case)]
            pub unsafe extern "C" fn $sym(
                param_page: *mut u64,
                params: *const u64,
                params_len: c_int,
            ) -> c_int {
                call_raw($name, param_page, params, params_len)
            }
        )*
    };
}

export! {
    Call_allocate => "allocate",
    Call_release => "release",
    Call_copy => "copy",
    Call_fill => "fill",
    Call_compare => "compare",
    Call_read32 => "read32",
    Call_read64 => "read64",
    Call_write32 => "write32",
    Call_write64 => "write64",
    Call_string_length => "string_length",
    Call_string_compare => "string_compare",
    Call_string_fill => "string_fill",
}

#[cfg(unix)]
export! {
    Call_open => "open",
    Call_close => "close",
    Call_map => "map",
    Call_unmap => "unmap",
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn null_page() {
        let params = [64u64, 1];
        let r = unsafe { Call_allocate(std::ptr::null_mut(), params.as_ptr(), 2) };
        assert_eq!(r, code::NULL_HANDLE);
    }

    #[test]
    fn negative_len() {
        let mut page = vec![0u64; PAGE_CAPACITY];
        let params = [64u64, 1];
        let r = unsafe { Call_allocate(page.as_mut_ptr(), params.as_ptr(), -1) };
        assert_eq!(r, code::ARITY_MISMATCH);
    }

    #[test]
    fn wrong_count_never_reads_params() {
        let mut page = vec![0u64; PAGE_CAPACITY];
        let r = unsafe { Call_allocate(page.as_mut_ptr(), std::ptr::null(), 3) };
        assert_eq!(r, code::ARITY_MISMATCH);
        assert!(page.iter().all(|v| *v == 0));
    }

    #[test]
    fn null_params_with_matching_count() {
        let mut page = vec![0u64; PAGE_CAPACITY];
        let r = unsafe { Call_release(page.as_mut_ptr(), std::ptr::null(), 1) };
        assert_eq!(r, code::NULL_HANDLE);
    }
}
