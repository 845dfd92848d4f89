//! Typed filter predicates and their wire form.
//!
//! A predicate serialises to `<field><op-token>:<value>`:
//!
//! ```text
//! status:VALID                 Equals
//! team___in:backend,frontend   In
//! name___icontains:bob         Contains (case-insensitive)
//! manager___isEmpty:true       IsEmpty
//! a:1|b:2                      AnyOf (OR)
//! ```
//!
//! The reserved characters `\ : , |` are backslash-escaped inside field names and
//! values, so any [`Predicate`] can be built without producing a malformed query.

use crate::errors::ListError;
use std::fmt;
use std::str::FromStr;

const OP_MARKER: &str = "___";
const OP_IN: &str = "___in";
const OP_ICONTAINS: &str = "___icontains";
const OP_IS_EMPTY: &str = "___isEmpty";

/// One filter constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    Equals { field: String, value: String },
    In { field: String, values: Vec<String> },
    /// Case-insensitive substring match
    Contains { field: String, value: String },
    IsEmpty { field: String, empty: bool },
    /// Matches when any member matches
    AnyOf(Vec<Predicate>),
}

impl Predicate {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn one_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_empty(field: impl Into<String>, empty: bool) -> Self {
        Self::IsEmpty {
            field: field.into(),
            empty,
        }
    }

    /// Serialise to the wire form expected by the backend.
    #[must_use]
    pub fn to_wire(&self) -> String {
        let mut out = String::new();
        self.write_wire(&mut out);
        out
    }

    fn write_wire(&self, out: &mut String) {
        match self {
            Self::Equals { field, value } => {
                escape_field_into(field, out);
                out.push(':');
                escape_into(value, out);
            }
            Self::In { field, values } => {
                escape_field_into(field, out);
                out.push_str(OP_IN);
                out.push(':');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    escape_into(value, out);
                }
            }
            Self::Contains { field, value } => {
                escape_field_into(field, out);
                out.push_str(OP_ICONTAINS);
                out.push(':');
                escape_into(value, out);
            }
            Self::IsEmpty { field, empty } => {
                escape_field_into(field, out);
                out.push_str(OP_IS_EMPTY);
                out.push(':');
                out.push_str(if *empty { "true" } else { "false" });
            }
            Self::AnyOf(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    member.write_wire(out);
                }
            }
        }
    }

    fn parse_single(input: &str) -> Result<Self, ListError> {
        let parts = split_unescaped(input, ':');
        if parts.len() != 2 {
            return Err(ListError::invalid_predicate(
                input,
                "expected exactly one ':' between field and value",
            ));
        }
        let (raw_field, raw_value) = (parts[0], parts[1]);
        if raw_field.is_empty() {
            return Err(ListError::invalid_predicate(input, "field name is empty"));
        }

        if let Some(field) = raw_field.strip_suffix(OP_IN) {
            let values = if raw_value.is_empty() {
                Vec::new()
            } else {
                split_unescaped(raw_value, ',').into_iter().map(unescape).collect()
            };
            return Ok(Self::In {
                field: unescape(field),
                values,
            });
        }
        if let Some(field) = raw_field.strip_suffix(OP_ICONTAINS) {
            return Ok(Self::contains(unescape(field), unescape(raw_value)));
        }
        if let Some(field) = raw_field.strip_suffix(OP_IS_EMPTY) {
            let empty = match raw_value {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(ListError::invalid_predicate(
                        input,
                        "isEmpty expects true or false",
                    ));
                }
            };
            return Ok(Self::is_empty(unescape(field), empty));
        }
        if let Some(idx) = find_unescaped(raw_field, OP_MARKER) {
            return Err(ListError::invalid_predicate(
                input,
                format!("unknown operator '{}'", &raw_field[idx..]),
            ));
        }
        Ok(Self::equals(unescape(raw_field), unescape(raw_value)))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl FromStr for Predicate {
    type Err = ListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let members = split_unescaped(s, '|');
        if members.len() == 1 {
            return Self::parse_single(s);
        }
        members
            .into_iter()
            .map(Self::parse_single)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::AnyOf)
    }
}

/// Field names containing the operator marker `___` have every `_` escaped, so the
/// marker never appears unescaped inside a field.
fn escape_field_into(field: &str, out: &mut String) {
    if !field.contains(OP_MARKER) {
        escape_into(field, out);
        return;
    }
    for c in field.chars() {
        if matches!(c, '\\' | ':' | ',' | '|' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
}

pub(crate) fn escape_into(raw: &str, out: &mut String) {
    for c in raw.chars() {
        if matches!(c, '\\' | ':' | ',' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
}

pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Split on `sep` where it is not preceded by an escaping backslash.
pub(crate) fn split_unescaped(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&input[start..]);
    parts
}

fn find_unescaped(input: &str, needle: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if input[i..].starts_with(needle) {
            return Some(i);
        }
    }
    None
}
