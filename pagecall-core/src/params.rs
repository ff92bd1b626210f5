//! Named-parameter binding.
//!
//! Hosts that describe calls as `name=value` pairs (scenario files, command
//! lines) bind them to the declared order of an operation here.

use crate::op::OpSpec;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("[{op}] expected {expected} arguments, got {actual}")]
    Count {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("[{op}] argument `{arg}` is not of the form name=value")]
    Malformed { op: &'static str, arg: String },

    #[error("[{op}] unknown parameter `{name}`")]
    Unknown { op: &'static str, name: String },

    #[error("[{op}] parameter `{name}` given twice")]
    Duplicate { op: &'static str, name: &'static str },

    #[error("[{op}] missing parameter `{name}`")]
    Missing { op: &'static str, name: &'static str },

    #[error("[{op}] bad value for `{name}`: {value}")]
    BadValue {
        op: &'static str,
        name: &'static str,
        value: String,
    },
}

/// Parse a numeric input: decimal, negative decimal (two's complement) or
/// `0x` hex.
pub fn parse_value(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok();
    }
    if s.starts_with('-') {
        return s.parse::<i64>().ok().map(|v| v as u64);
    }
    s.parse::<u64>().ok()
}

/// Split `name=value`.
pub fn split_arg(arg: &str) -> Option<(&str, &str)> {
    let (name, value) = arg.split_once('=')?;
    Some((name.trim(), value.trim()))
}

/// Order `args` (`name=value`) by the parameter list of `spec` and parse each
/// value with [`parse_value`].
pub fn bind_named<S: AsRef<str>>(spec: &OpSpec, args: &[S]) -> Result<Vec<u64>, ParamError> {
    bind_with(spec, args, |_, value| parse_value(value))
}

/// Like [`bind_named`], with a caller-supplied value parser. The parser sees
/// the parameter name and the raw value text.
pub fn bind_with<S, F>(spec: &OpSpec, args: &[S], mut parse: F) -> Result<Vec<u64>, ParamError>
where
    S: AsRef<str>,
    F: FnMut(&'static str, &str) -> Option<u64>,
{
    let op = spec.name;
    if args.len() != spec.arity() {
        return Err(ParamError::Count {
            op,
            expected: spec.arity(),
            actual: args.len(),
        });
    }

    let mut bound: Vec<Option<u64>> = vec![None; spec.arity()];
    for arg in args {
        let arg = arg.as_ref();
        let (name, value) = split_arg(arg).ok_or_else(|| ParamError::Malformed {
            op,
            arg: arg.to_string(),
        })?;
        let pos = spec
            .params
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ParamError::Unknown { op, name: name.to_string() })?;
        let pname = spec.params[pos].name;
        if bound[pos].is_some() {
            return Err(ParamError::Duplicate { op, name: pname });
        }
        let v = parse(pname, value).ok_or_else(|| ParamError::BadValue {
            op,
            name: pname,
            value: value.to_string(),
        })?;
        bound[pos] = Some(v);
    }

    bound
        .into_iter()
        .zip(spec.params)
        .map(|(v, p)| v.ok_or(ParamError::Missing { op, name: p.name }))
        .collect()
}
