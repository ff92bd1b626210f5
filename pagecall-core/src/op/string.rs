//! NUL-terminated byte strings.

use std::ffi::CStr;
use std::ptr;

use super::memory::ordering_result;
use super::{Call, OpSpec};
use crate::error::PageError;
use crate::resolve::{Kind, Param};

pub const OPS: &[OpSpec] = &[
    OpSpec {
        name: "string_length",
        params: &[Param::handle("str_idx", Kind::Memory)],
        effect: string_length,
    },
    OpSpec {
        name: "string_compare",
        params: &[
            Param::handle("lhs_idx", Kind::Memory),
            Param::handle("rhs_idx", Kind::Memory),
            Param::value("len"),
        ],
        effect: string_compare,
    },
    OpSpec {
        name: "string_fill",
        params: &[
            Param::handle("dst_idx", Kind::Memory),
            Param::value("content"),
            Param::value("len"),
        ],
        effect: string_fill,
    },
];

unsafe fn string_length(call: &mut Call<'_>) -> Result<i64, PageError> {
    let s = CStr::from_ptr(call.ptr(0).cast_const().cast());
    Ok(s.to_bytes().len() as i64)
}

/// Compare at most `len` bytes, stopping after the first NUL.
unsafe fn string_compare(call: &mut Call<'_>) -> Result<i64, PageError> {
    let lhs = call.ptr(0).cast_const();
    let rhs = call.ptr(1).cast_const();
    let len = call.value(2) as usize;

    for i in 0..len {
        let a = *lhs.add(i);
        let b = *rhs.add(i);
        if a != b {
            return Ok(ordering_result(a.cmp(&b)));
        }
        if a == 0 {
            break;
        }
    }
    Ok(0)
}

/// Tile `content` over `dst[0..len]` and terminate at `dst[len]`.
///
/// Content at least `len` bytes long is truncated; shorter content repeats.
/// Empty content zero-fills. `dst` must hold `len + 1` bytes. `content` may
/// point into `dst`.
unsafe fn string_fill(call: &mut Call<'_>) -> Result<i64, PageError> {
    let dst = call.ptr(0);
    let len = call.value(2) as usize;
    let src = call.value(1) as usize as *const u8;
    let clen = if src.is_null() { 0 } else { libc::strlen(src.cast()) };

    if clen == 0 {
        ptr::write_bytes(dst, 0, len);
    } else if clen >= len {
        ptr::copy(src, dst, len);
    } else {
        let mut written = 0;
        while written < len {
            let chunk = clen.min(len - written);
            ptr::copy(src, dst.add(written), chunk);
            written += chunk;
        }
    }
    *dst.add(len) = 0;

    Ok(len as i64)
}
