//! Input groups.
//!
//! A test may declare groups of variables. Each group expands the test into
//! one sub-test per combination of its values, with `$name` replaced in the
//! command arguments and expectations. `$!name` stands for the negated value.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{bail, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// Value of one variable: fixed, a list to sweep, or an inclusive range.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ArgValue {
    Range {
        start: i64,
        end: i64,
        #[serde(default)]
        step: Option<i64>,
    },
    List(Vec<Scalar>),
    Single(Scalar),
}

impl ArgValue {
    fn values(&self, key: &str) -> Result<Vec<String>> {
        let values: Vec<String> = match self {
            ArgValue::Single(v) => vec![v.to_string()],
            ArgValue::List(items) => items.iter().map(Scalar::to_string).collect(),
            ArgValue::Range { start, end, step } => {
                let step = step.unwrap_or(1);
                if step <= 0 {
                    bail!("input '{key}': range step must be positive, got {step}");
                }
                let mut values = Vec::new();
                let mut v = *start;
                while v <= *end {
                    values.push(v.to_string());
                    match v.checked_add(step) {
                        Some(next) => v = next,
                        None => break,
                    }
                }
                values
            }
        };
        if values.is_empty() {
            bail!("input '{key}' has no values");
        }
        Ok(values)
    }

    fn sweeps(&self) -> bool {
        !matches!(self, ArgValue::Single(_))
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct InputGroup {
    /// Defaults to `input<N>`, counting groups of the test from 1.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub args: BTreeMap<String, ArgValue>,
    /// Overrides the test's own setting for the sub-tests of this group.
    #[serde(default)]
    pub break_if_fail: Option<bool>,
}

/// One combination of group values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// `_key=value` for every swept variable, in key order.
    pub suffix: String,
    pub vars: Vec<(String, String)>,
}

impl InputGroup {
    /// Every combination of values, varying the last key fastest.
    pub fn bindings(&self) -> Result<Vec<Binding>> {
        let mut bindings = vec![Binding { suffix: String::new(), vars: Vec::new() }];
        for (key, value) in &self.args {
            let values = value.values(key)?;
            bindings = bindings
                .into_iter()
                .flat_map(|b| {
                    values.iter().map(move |v| {
                        let mut next = b.clone();
                        if value.sweeps() {
                            next.suffix.push_str(&format!("_{key}={v}"));
                        }
                        next.vars.push((key.clone(), v.clone()));
                        next
                    })
                })
                .collect();
        }
        Ok(bindings)
    }
}

/// Replace `$!key` with `!value` and `$key` with `value`. Longer keys are
/// replaced first so `$offset` is not eaten by `$off`.
pub fn replace_vars(text: &str, vars: &[(String, String)]) -> String {
    let mut ordered: Vec<&(String, String)> = vars.iter().collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = text.to_string();
    for (key, value) in ordered {
        out = out.replace(&format!("$!{key}"), &format!("!{value}"));
        out = out.replace(&format!("${key}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn group(text: &str) -> InputGroup {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn value_shapes() {
        let g = group(
            r#"
            args = { a = 3, b = "x", c = [1, "two"], d = { start = 0, end = 6, step = 3 } }
            "#,
        );
        assert_eq!(g.args["a"], ArgValue::Single(Scalar::Int(3)));
        assert_eq!(g.args["b"], ArgValue::Single(Scalar::Text("x".into())));
        assert_eq!(
            g.args["c"],
            ArgValue::List(vec![Scalar::Int(1), Scalar::Text("two".into())])
        );
        assert_eq!(g.args["d"], ArgValue::Range { start: 0, end: 6, step: Some(3) });
        assert_eq!(g.args["d"].values("d").unwrap(), vec!["0", "3", "6"]);
    }

    #[test]
    fn cartesian_product_in_key_order() {
        let g = group(
            r#"
            args = { val = [7, -1], fixed = 5, off = { start = 0, end = 8, step = 8 } }
            "#,
        );
        let suffixes: Vec<String> = g.bindings().unwrap().into_iter().map(|b| b.suffix).collect();
        assert_eq!(
            suffixes,
            vec!["_off=0_val=7", "_off=0_val=-1", "_off=8_val=7", "_off=8_val=-1"]
        );

        let first = &g.bindings().unwrap()[0];
        assert!(first.vars.contains(&("fixed".to_string(), "5".to_string())));
    }

    #[test]
    fn range_is_inclusive_with_unit_default() {
        let g = group("args = { n = { start = -1, end = 1 } }");
        let vars: Vec<String> =
            g.bindings().unwrap().into_iter().map(|b| b.vars[0].1.clone()).collect();
        assert_eq!(vars, vec!["-1", "0", "1"]);
    }

    #[test]
    fn bad_ranges() {
        let zero = group("args = { n = { start = 0, end = 4, step = 0 } }");
        assert!(zero.bindings().unwrap_err().to_string().contains("positive"));
        let empty = group("args = { n = { start = 4, end = 0 } }");
        assert!(empty.bindings().is_err());
        let none = group("args = { n = [] }");
        assert!(none.bindings().is_err());
    }

    #[test]
    fn substitution() {
        let vars = vec![("off".to_string(), "8".to_string()), ("offset".to_string(), "16".to_string())];
        assert_eq!(replace_vars("offset=$offset", &vars), "offset=16");
        assert_eq!(replace_vars("offset=$off", &vars), "offset=8");
        assert_eq!(replace_vars("$!off", &vars), "!8");
        assert_eq!(replace_vars("$other", &vars), "$other");
    }
}
