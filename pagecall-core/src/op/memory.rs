//! Heap blocks and raw memory access.

use std::cmp::Ordering;
use std::ptr;

use super::{Call, OpSpec};
use crate::error::PageError;
use crate::page::SlotKind;
use crate::resolve::{Kind, Param};

pub const OPS: &[OpSpec] = &[
    OpSpec {
        name: "allocate",
        params: &[Param::value("size"), Param::output("out_idx", Kind::Pointer)],
        effect: allocate,
    },
    OpSpec {
        name: "release",
        params: &[Param::handle("mem_idx", Kind::Pointer)],
        effect: release,
    },
    OpSpec {
        name: "copy",
        params: &[
            Param::handle("dst_idx", Kind::Memory),
            Param::handle("src_idx", Kind::Memory),
            Param::value("len"),
        ],
        effect: copy,
    },
    OpSpec {
        name: "fill",
        params: &[
            Param::handle("dst_idx", Kind::Memory),
            Param::value("byte"),
            Param::value("len"),
        ],
        effect: fill,
    },
    OpSpec {
        name: "compare",
        params: &[
            Param::handle("lhs_idx", Kind::Memory),
            Param::handle("rhs_idx", Kind::Memory),
            Param::value("len"),
        ],
        effect: compare,
    },
    OpSpec {
        name: "read32",
        params: &[Param::handle("mem_idx", Kind::Memory), Param::value("offset")],
        effect: read32,
    },
    OpSpec {
        name: "read64",
        params: &[Param::handle("mem_idx", Kind::Memory), Param::value("offset")],
        effect: read64,
    },
    OpSpec {
        name: "write32",
        params: &[
            Param::handle("mem_idx", Kind::Memory),
            Param::value("offset"),
            Param::value("val"),
        ],
        effect: write32,
    },
    OpSpec {
        name: "write64",
        params: &[
            Param::handle("mem_idx", Kind::Memory),
            Param::value("offset"),
            Param::value("val"),
        ],
        effect: write64,
    },
];

/// Map an ordering to the libc-style -1/0/1 result.
pub(crate) fn ordering_result(ord: Ordering) -> i64 {
    match ord {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

unsafe fn allocate(call: &mut Call<'_>) -> Result<i64, PageError> {
    let size = call.value(0);
    let addr = libc::malloc(size as usize);
    if addr.is_null() {
        return Err(PageError::AllocFailed { op: call.op(), size });
    }
    call.emit(1, addr as usize as u64, SlotKind::Pointer);
    Ok(0)
}

unsafe fn release(call: &mut Call<'_>) -> Result<i64, PageError> {
    libc::free(call.ptr(0).cast());
    call.invalidate(0);
    Ok(0)
}

unsafe fn copy(call: &mut Call<'_>) -> Result<i64, PageError> {
    let len = call.value(2) as usize;
    ptr::copy(call.ptr(1).cast_const(), call.ptr(0), len);
    Ok(0)
}

unsafe fn fill(call: &mut Call<'_>) -> Result<i64, PageError> {
    let byte = call.value(1) as u8;
    let len = call.value(2) as usize;
    ptr::write_bytes(call.ptr(0), byte, len);
    Ok(0)
}

unsafe fn compare(call: &mut Call<'_>) -> Result<i64, PageError> {
    let len = call.value(2) as usize;
    let lhs = std::slice::from_raw_parts(call.ptr(0).cast_const(), len);
    let rhs = std::slice::from_raw_parts(call.ptr(1).cast_const(), len);
    Ok(ordering_result(lhs.cmp(rhs)))
}

unsafe fn read32(call: &mut Call<'_>) -> Result<i64, PageError> {
    let at = call.ptr(0).wrapping_add(call.value(1) as usize);
    Ok(i64::from(ptr::read_unaligned(at.cast::<i32>())))
}

unsafe fn read64(call: &mut Call<'_>) -> Result<i64, PageError> {
    let at = call.ptr(0).wrapping_add(call.value(1) as usize);
    Ok(ptr::read_unaligned(at.cast::<i64>()))
}

unsafe fn write32(call: &mut Call<'_>) -> Result<i64, PageError> {
    let at = call.ptr(0).wrapping_add(call.value(1) as usize);
    ptr::write_unaligned(at.cast::<u32>(), call.value(2) as u32);
    Ok(0)
}

unsafe fn write64(call: &mut Call<'_>) -> Result<i64, PageError> {
    let at = call.ptr(0).wrapping_add(call.value(1) as usize);
    ptr::write_unaligned(at.cast::<u64>(), call.value(2));
    Ok(0)
}
