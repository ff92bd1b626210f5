//! Memory mappings.
//!
//! Protection and mapping flags travel as small bit sets so the host does not
//! need to know platform constants:
//! - protection: bit 0 = read, bit 1 = write
//! - mapping: bit 0 = shared (1) / private (0), bit 1 = fixed, bit 2 = anonymous

use bitflags::bitflags;

use super::{Call, OpSpec};
use crate::error::PageError;
use crate::page::SlotKind;
use crate::resolve::{Kind, Param};

pub const OPS: &[OpSpec] = &[
    OpSpec {
        name: "map",
        params: &[
            Param::value("addr"),
            Param::value("len"),
            Param::value("prot"),
            Param::value("flags"),
            Param::nullable("fd_idx", Kind::Descriptor),
            Param::value("offset"),
            Param::output("out_idx", Kind::Mapping),
        ],
        effect: map,
    },
    OpSpec {
        name: "unmap",
        params: &[Param::handle("map_idx", Kind::Mapping), Param::value("len")],
        effect: unmap,
    },
];

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Prot: u64 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MapFlags: u64 {
        const SHARED = 1 << 0;
        const FIXED = 1 << 1;
        const ANONYMOUS = 1 << 2;
    }
}

impl Prot {
    pub fn to_native(self) -> libc::c_int {
        let mut prot = libc::PROT_NONE;
        if self.contains(Prot::READ) {
            prot |= libc::PROT_READ;
        }
        if self.contains(Prot::WRITE) {
            prot |= libc::PROT_WRITE;
        }
        prot
    }
}

impl MapFlags {
    pub fn to_native(self) -> libc::c_int {
        let mut flags = if self.contains(MapFlags::SHARED) {
            libc::MAP_SHARED
        } else {
            libc::MAP_PRIVATE
        };
        if self.contains(MapFlags::FIXED) {
            flags |= libc::MAP_FIXED;
        }
        if self.contains(MapFlags::ANONYMOUS) {
            flags |= libc::MAP_ANON;
        }
        flags
    }
}

unsafe fn map(call: &mut Call<'_>) -> Result<i64, PageError> {
    let hint = call.value(0) as usize as *mut libc::c_void;
    let len = call.value(1) as usize;
    let prot = Prot::from_bits_truncate(call.value(2));
    let flags = MapFlags::from_bits_truncate(call.value(3));
    let fd = if flags.contains(MapFlags::ANONYMOUS) {
        -1
    } else {
        call.value(4) as libc::c_int
    };
    let offset = call.value(5) as libc::off_t;

    let addr = libc::mmap(hint, len, prot.to_native(), flags.to_native(), fd, offset);
    let addr = accept_mapping(addr, len)
        .map_err(|errno| PageError::MapFailed { op: call.op(), errno })?;

    call.emit(6, addr, SlotKind::Mapping);
    Ok(0)
}

/// Check an `mmap` result. A mapping at address 0 cannot be told apart from
/// an empty slot, so it is undone and reported as `EINVAL`.
unsafe fn accept_mapping(addr: *mut libc::c_void, len: usize) -> Result<u64, i32> {
    if addr == libc::MAP_FAILED {
        return Err(std::io::Error::last_os_error().raw_os_error().unwrap_or(0));
    }
    if addr.is_null() {
        libc::munmap(addr, len);
        return Err(libc::EINVAL);
    }
    Ok(addr as usize as u64)
}

unsafe fn unmap(call: &mut Call<'_>) -> Result<i64, PageError> {
    let len = call.value(1) as usize;
    if libc::munmap(call.ptr(0).cast(), len) != 0 {
        return Err(PageError::last_os(call.op()));
    }
    call.invalidate(0);
    Ok(0)
}
