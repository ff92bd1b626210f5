use std::env;
use std::fmt;
use std::sync::OnceLock;

/// Trace categories, enabled via environment variables.
///
/// Supported:
/// - PAGECALL_TRACE="dispatch,resolve" (comma/space separated; "all" enables all)
/// - PAGECALL_TRACE_DISPATCH=1, PAGECALL_TRACE_RESOLVE=1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceKind {
    Dispatch,
    Resolve,
}

const M_DISPATCH: u32 = 1 << 0;
const M_RESOLVE: u32 = 1 << 1;

fn parse_bool_env(name: &str) -> bool {
    match env::var(name) {
        Ok(v) => {
            let s = v.trim().to_ascii_lowercase();
            !(s.is_empty() || s == "0" || s == "false" || s == "no" || s == "off")
        }
        Err(_) => false,
    }
}

fn parse_mask_from_trace_list(s: &str) -> u32 {
    let mut mask = 0u32;
    for raw in s.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => mask |= M_DISPATCH | M_RESOLVE,
            "dispatch" | "call" => mask |= M_DISPATCH,
            "resolve" => mask |= M_RESOLVE,
            _ => {}
        }
    }
    mask
}

fn build_mask() -> u32 {
    let mut mask = 0u32;

    if let Ok(list) = env::var("PAGECALL_TRACE") {
        mask |= parse_mask_from_trace_list(&list);
    }
    if parse_bool_env("PAGECALL_TRACE_DISPATCH") {
        mask |= M_DISPATCH;
    }
    if parse_bool_env("PAGECALL_TRACE_RESOLVE") {
        mask |= M_RESOLVE;
    }

    mask
}

fn mask() -> u32 {
    static MASK: OnceLock<u32> = OnceLock::new();
    *MASK.get_or_init(build_mask)
}

pub fn enabled(k: TraceKind) -> bool {
    match k {
        TraceKind::Dispatch => (mask() & M_DISPATCH) != 0,
        TraceKind::Resolve => (mask() & M_RESOLVE) != 0,
    }
}

pub fn dispatch(args: fmt::Arguments) {
    if !enabled(TraceKind::Dispatch) {
        return;
    }
    log::info!("{}", args);
}

pub fn resolve(args: fmt::Arguments) {
    if !enabled(TraceKind::Resolve) {
        return;
    }
    log::info!("{}", args);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_list_parsing() {
        assert_eq!(parse_mask_from_trace_list("all"), M_DISPATCH | M_RESOLVE);
        assert_eq!(parse_mask_from_trace_list("call; resolve"), M_DISPATCH | M_RESOLVE);
        assert_eq!(parse_mask_from_trace_list("dispatch,bogus"), M_DISPATCH);
        assert_eq!(parse_mask_from_trace_list(""), 0);
    }
}
