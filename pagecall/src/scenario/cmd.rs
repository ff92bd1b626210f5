use serde::Deserialize;

use super::Condition;

/// One operation call and its expected outcome.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Cmd {
    pub opfunc: String,
    #[serde(flatten)]
    pub condition: Condition,
    /// `name=value` pairs. A value quoted with `'` or `"` is passed as the
    /// address of a NUL-terminated copy of the text.
    #[serde(default)]
    pub args: Vec<String>,
    /// Log how long the call took.
    #[serde(default)]
    pub perf: bool,
}

/// The text of a quoted argument value, if `value` is quoted.
pub fn quoted(value: &str) -> Option<&str> {
    let value = value.trim();
    ['\'', '"'].into_iter().find_map(|q| {
        value
            .strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
    })
}
