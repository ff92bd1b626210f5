//! File descriptor lifecycle.

use std::ffi::CStr;

use super::{Call, OpSpec};
use crate::error::PageError;
use crate::page::SlotKind;
use crate::resolve::{Kind, Param};

pub const OPS: &[OpSpec] = &[
    OpSpec {
        name: "open",
        params: &[Param::value("path"), Param::output("out_idx", Kind::Descriptor)],
        effect: open,
    },
    OpSpec {
        name: "close",
        params: &[Param::handle("fd_idx", Kind::Descriptor)],
        effect: close,
    },
];

const OPEN_FLAGS: libc::c_int = libc::O_RDWR | libc::O_CREAT | libc::O_CLOEXEC;
const OPEN_MODE: libc::c_uint = 0o600;

/// `path` is the address of a NUL-terminated path; the file is opened for
/// read/write and created if missing.
unsafe fn open(call: &mut Call<'_>) -> Result<i64, PageError> {
    let path = call.value(0) as usize as *const libc::c_char;
    if path.is_null() {
        return Err(PageError::Os { op: call.op(), errno: libc::EFAULT });
    }

    let fd = libc::open(path, OPEN_FLAGS, OPEN_MODE);
    if fd < 0 {
        log::debug!("open {:?} failed", CStr::from_ptr(path));
        return Err(PageError::last_os(call.op()));
    }
    // 0 is the empty-slot sentinel
    let fd = if fd == 0 {
        move_above(fd, 1).map_err(|errno| PageError::Os { op: call.op(), errno })?
    } else {
        fd
    };

    call.emit(1, fd as u64, SlotKind::Descriptor);
    Ok(0)
}

/// Re-home `fd` on the lowest free descriptor `>= floor` and close the
/// original. On failure the original is closed too.
unsafe fn move_above(fd: libc::c_int, floor: libc::c_int) -> Result<libc::c_int, i32> {
    let moved = libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, floor);
    let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
    libc::close(fd);
    if moved < 0 {
        return Err(errno);
    }
    Ok(moved)
}

/// The slot is cleared only if `close` succeeds.
unsafe fn close(call: &mut Call<'_>) -> Result<i64, PageError> {
    let fd = call.value(0) as libc::c_int;
    if libc::close(fd) != 0 {
        return Err(PageError::last_os(call.op()));
    }
    call.invalidate(0);
    Ok(0)
}
