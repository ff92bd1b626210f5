use std::fmt;

use pagecall_core::PageError;
use serde::{de::Error as DError, Deserialize, Deserializer};

use super::input::replace_vars;

/// Expected outcome of a command, compared against its status.
///
/// Failures compare by their negative code, so `expect_eq = -14` and
/// `expect_eq = "NullHandle"` are the same expectation.
///
/// Hex text is read as 64 bits: `"0xFFFFFFFF"` is 4294967295, never the -1 a
/// sign-extended `read32` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq(i64),
    Ne(i64),
    /// Text naming input variables, resolved when the test is expanded.
    Pending { eq: bool, text: String },
}

impl Condition {
    pub fn holds(&self, status: i64) -> bool {
        match self {
            Condition::Eq(v) => status == *v,
            Condition::Ne(v) => status != *v,
            Condition::Pending { .. } => false,
        }
    }

    /// Resolve a pending expectation against input variables.
    pub fn substitute(&self, vars: &[(String, String)]) -> Result<Self, String> {
        match self {
            Condition::Pending { eq, text } => Condition::parse(*eq, &replace_vars(text, vars)),
            resolved => Ok(resolved.clone()),
        }
    }

    /// Parse an expectation written as text: decimal, `0x` hex or an error
    /// name, optionally prefixed with `!` to negate it.
    pub fn parse(eq: bool, s: &str) -> Result<Self, String> {
        let s = s.trim();
        let (eq, body) = match s.strip_prefix('!') {
            Some(rest) => (!eq, rest.trim()),
            None => (eq, s),
        };
        let v = parse_expected(body).ok_or_else(|| format!("bad expected value `{s}`"))?;
        Ok(if eq { Condition::Eq(v) } else { Condition::Ne(v) })
    }
}

fn parse_expected(s: &str) -> Option<i64> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok().map(|v| v as i64);
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    PageError::from_name(s).map(i64::from)
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Eq(v) => write!(f, "== {v}"),
            Condition::Ne(v) => write!(f, "!= {v}"),
            Condition::Pending { eq: true, text } => write!(f, "== {text}"),
            Condition::Pending { eq: false, text } => write!(f, "!= {text}"),
        }
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Value {
            Number(i64),
            Text(String),
        }

        #[derive(Deserialize)]
        struct Helper {
            expect_eq: Option<Value>,
            expect_ne: Option<Value>,
        }

        let helper = Helper::deserialize(deserializer)?;

        let build = |eq: bool, value: Value| match value {
            Value::Number(n) => Ok(if eq { Condition::Eq(n) } else { Condition::Ne(n) }),
            Value::Text(s) if s.contains('$') => Ok(Condition::Pending { eq, text: s }),
            Value::Text(s) => Condition::parse(eq, &s).map_err(D::Error::custom),
        };

        match (helper.expect_eq, helper.expect_ne) {
            (Some(v), None) => build(true, v),
            (None, Some(v)) => build(false, v),
            (Some(_), Some(_)) => Err(D::Error::custom(
                "'expect_eq' and 'expect_ne' are mutually exclusive",
            )),
            (None, None) => Err(D::Error::custom(
                "missing condition, please give 'expect_eq' or 'expect_ne'",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecall_core::error::code;
    use pretty_assertions::assert_eq;

    #[test]
    fn textual_forms() {
        assert_eq!(Condition::parse(true, "0xDEADBEEF"), Ok(Condition::Eq(0xDEAD_BEEF)));
        assert_eq!(Condition::parse(true, "-3"), Ok(Condition::Eq(-3)));
        assert_eq!(Condition::parse(true, "!0"), Ok(Condition::Ne(0)));
        assert_eq!(Condition::parse(false, "!0"), Ok(Condition::Eq(0)));
        assert_eq!(
            Condition::parse(true, "NullHandle"),
            Ok(Condition::Eq(i64::from(code::NULL_HANDLE)))
        );
        assert_eq!(Condition::parse(true, "0xFFFFFFFFFFFFFFFF"), Ok(Condition::Eq(-1)));
        assert!(Condition::parse(true, "Nope").is_err());
    }

    #[test]
    fn holds() {
        assert!(Condition::Eq(5).holds(5));
        assert!(!Condition::Eq(5).holds(4));
        assert!(Condition::Ne(5).holds(4));
        assert_eq!(Condition::Ne(-14).to_string(), "!= -14");
    }

    #[test]
    fn hex_is_sixty_four_bits() {
        let all_ones_32 = Condition::parse(true, "0xFFFFFFFF").unwrap();
        assert_eq!(all_ones_32, Condition::Eq(0xFFFF_FFFF));
        // what read32 of 0xFFFFFFFF returns
        assert!(!all_ones_32.holds(-1));
        assert!(Condition::parse(true, "-1").unwrap().holds(-1));
    }

    #[test]
    fn variables_stay_pending_until_substituted() {
        let c: Condition = toml::from_str("expect_eq = \"$val\"").unwrap();
        assert_eq!(c, Condition::Pending { eq: true, text: "$val".into() });
        assert!(!c.holds(0));

        let vars = vec![("val".to_string(), "-1".to_string())];
        assert_eq!(c.substitute(&vars), Ok(Condition::Eq(-1)));

        let negated: Condition = toml::from_str("expect_eq = \"$!val\"").unwrap();
        assert_eq!(negated.substitute(&vars), Ok(Condition::Ne(-1)));
        let flipped: Condition = toml::from_str("expect_ne = \"$!val\"").unwrap();
        assert_eq!(flipped.substitute(&vars), Ok(Condition::Eq(-1)));

        assert!(c.substitute(&[]).is_err());
        assert_eq!(Condition::Eq(3).substitute(&vars), Ok(Condition::Eq(3)));
    }
}
