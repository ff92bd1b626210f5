// Runs in its own test binary: it closes the process's stdin.
#![cfg(unix)]

use std::ffi::CString;

use anyhow::Result;
use pretty_assertions::assert_eq;

use pagecall_core::{ParamPage, Registry, SlotKind};

#[test]
fn open_never_stores_descriptor_zero() -> Result<()> {
    let path = std::env::temp_dir().join(format!("pagecall-stdin-{}", std::process::id()));
    let cpath = CString::new(path.to_string_lossy().into_owned())?;
    let ops = Registry::builtin();
    let mut page = ParamPage::new();

    unsafe { libc::close(0) };
    assert_eq!(unsafe { ops.invoke("open", &mut page, &[cpath.as_ptr() as u64, 7], 2) }, Ok(0));
    assert_eq!(page.slot_kind(7), Some(SlotKind::Descriptor));
    assert_ne!(page.get(7), Some(0));

    assert_eq!(unsafe { ops.invoke("close", &mut page, &[7], 1) }, Ok(0));
    assert_eq!(page.get(7), Some(0));

    std::fs::remove_file(&path)?;
    Ok(())
}
