//! Portable type model
//!
//! Every engine's native types compress into a [`PortableType`], which is what
//! cross-engine comparisons and literal rendering are keyed on. The reverse
//! direction, choosing a native type for data that did not originate in an
//! engine, is keyed on [`CommonKind`].

use serde::{Deserialize, Serialize};

use crate::Value;

/// Engine-agnostic storage category of a native type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortableType {
    /// 1-byte integer
    Int1,
    /// 2-byte integer
    Int2,
    /// 4-byte integer
    Int4,
    /// 8-byte integer
    Int8,
    /// Approximate (floating point) number
    Numeric,
    /// Exact decimal
    Decimal,
    String,
    Bool,
    Date,
    Time,
    DateTime,
    Binary,
}

impl PortableType {
    pub const ALL: [PortableType; 12] = [
        PortableType::Int1,
        PortableType::Int2,
        PortableType::Int4,
        PortableType::Int8,
        PortableType::Numeric,
        PortableType::Decimal,
        PortableType::String,
        PortableType::Bool,
        PortableType::Date,
        PortableType::Time,
        PortableType::DateTime,
        PortableType::Binary,
    ];

    /// Whether values of this category render as unquoted numbers
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PortableType::Int1
                | PortableType::Int2
                | PortableType::Int4
                | PortableType::Int8
                | PortableType::Numeric
                | PortableType::Decimal
        )
    }

    /// Whether values of this category are temporal
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            PortableType::Date | PortableType::Time | PortableType::DateTime
        )
    }

    /// Render `value` as a SQL literal for a column of this category.
    ///
    /// NULL is always the bare `NULL` token. Numeric categories emit
    /// unquoted text only for values that are numbers (or text that parses
    /// as one); everything else is quoted and escaped through `style`.
    ///
    /// ```
    /// use dbm_core::{LiteralStyle, PortableType, Value};
    ///
    /// let style = LiteralStyle::ANSI;
    /// assert_eq!(PortableType::Int4.literal(&Value::Int32(7), &style), "7");
    /// assert_eq!(PortableType::String.literal(&Value::from("it's"), &style), "'it''s'");
    /// assert_eq!(PortableType::Date.literal(&Value::Null, &style), "NULL");
    /// ```
    pub fn literal(self, value: &Value, style: &LiteralStyle) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Array(items) => {
                let rendered: Vec<String> =
                    items.iter().map(|item| self.literal(item, style)).collect();
                format!("[{}]", rendered.join(", "))
            }
            _ if self.is_numeric() => numeric_literal(value, style),
            _ if self == PortableType::Bool => bool_literal(value, style),
            _ => quoted_literal(value, style),
        }
    }
}

/// Generic logical kinds a converter must be able to place on every engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommonKind {
    Varchar,
    Char,
    Text,
    Mediumtext,
    Longtext,
    Int1,
    Int2,
    Int4,
    Int8,
    UnsignedInt1,
    UnsignedInt2,
    UnsignedInt4,
    UnsignedInt8,
    Decimal,
    Numeric,
    Bit,
    Bool,
    Date,
    Time,
    Datetime,
    Timestamp,
    Binary,
    Varbinary,
    Blob,
    Mediumblob,
    Longblob,
    Enum,
    Json,
}

impl CommonKind {
    pub const ALL: [CommonKind; 28] = [
        CommonKind::Varchar,
        CommonKind::Char,
        CommonKind::Text,
        CommonKind::Mediumtext,
        CommonKind::Longtext,
        CommonKind::Int1,
        CommonKind::Int2,
        CommonKind::Int4,
        CommonKind::Int8,
        CommonKind::UnsignedInt1,
        CommonKind::UnsignedInt2,
        CommonKind::UnsignedInt4,
        CommonKind::UnsignedInt8,
        CommonKind::Decimal,
        CommonKind::Numeric,
        CommonKind::Bit,
        CommonKind::Bool,
        CommonKind::Date,
        CommonKind::Time,
        CommonKind::Datetime,
        CommonKind::Timestamp,
        CommonKind::Binary,
        CommonKind::Varbinary,
        CommonKind::Blob,
        CommonKind::Mediumblob,
        CommonKind::Longblob,
        CommonKind::Enum,
        CommonKind::Json,
    ];
}

/// How an engine spells literals that have more than one SQL form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralStyle {
    pub bool_true: &'static str,
    pub bool_false: &'static str,
    /// Backslash is an escape character inside string literals
    pub backslash_escapes: bool,
    pub nan: &'static str,
    pub infinity: &'static str,
    pub neg_infinity: &'static str,
}

impl LiteralStyle {
    /// Standard SQL: quotes doubled, backslash literal, TRUE/FALSE keywords
    pub const ANSI: LiteralStyle = LiteralStyle {
        bool_true: "TRUE",
        bool_false: "FALSE",
        backslash_escapes: false,
        nan: "'NaN'",
        infinity: "'Infinity'",
        neg_infinity: "'-Infinity'",
    };

    /// Wrap text in single quotes, escaping embedded quotes by doubling
    pub fn quote_string(&self, text: &str) -> String {
        format!("'{}'", self.escape_string(text))
    }

    /// Escape text for placement between single quotes
    pub fn escape_string(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '\'' => out.push_str("''"),
                '\\' if self.backslash_escapes => out.push_str("\\\\"),
                _ => out.push(ch),
            }
        }
        out
    }

    fn quote_bytes(&self, bytes: &[u8]) -> String {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return self.quote_string(text);
        }
        if !self.backslash_escapes {
            return self.quote_string(&String::from_utf8_lossy(bytes));
        }
        let mut out = String::with_capacity(bytes.len() + 2);
        out.push('\'');
        for &b in bytes {
            match b {
                b'\'' => out.push_str("''"),
                b'\\' => out.push_str("\\\\"),
                0x20..=0x7e => out.push(b as char),
                _ => out.push_str(&format!("\\x{:02X}", b)),
            }
        }
        out.push('\'');
        out
    }
}

fn numeric_literal(value: &Value, style: &LiteralStyle) -> String {
    match value {
        Value::Int8(v) => v.to_string(),
        Value::Int16(v) => v.to_string(),
        Value::Int32(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::UInt64(v) => v.to_string(),
        Value::Float32(v) if v.is_finite() => v.to_string(),
        Value::Float32(v) => float_literal(*v as f64, style),
        Value::Float64(v) => float_literal(*v, style),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Value::Decimal(text) | Value::String(text) if is_numeric_text(text.trim()) => {
            text.trim().to_string()
        }
        other => quoted_literal(other, style),
    }
}

fn float_literal(v: f64, style: &LiteralStyle) -> String {
    if v.is_nan() {
        style.nan.to_string()
    } else if v.is_infinite() {
        if v > 0.0 {
            style.infinity.to_string()
        } else {
            style.neg_infinity.to_string()
        }
    } else {
        v.to_string()
    }
}

fn bool_literal(value: &Value, style: &LiteralStyle) -> String {
    let flag = match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        other => other.as_i64().map(|v| v != 0),
    };
    match flag {
        Some(true) => style.bool_true.to_string(),
        Some(false) => style.bool_false.to_string(),
        None => quoted_literal(value, style),
    }
}

fn quoted_literal(value: &Value, style: &LiteralStyle) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) | Value::Decimal(s) => style.quote_string(s),
        Value::Bytes(bytes) => style.quote_bytes(bytes),
        Value::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
        Value::Time(t) => format!("'{}'", t.format("%H:%M:%S%.f")),
        Value::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        Value::DateTimeUtc(dt) => format!("'{}'", dt.naive_utc().format("%Y-%m-%d %H:%M:%S%.f")),
        Value::Json(json) => style.quote_string(&json.to_string()),
        other => style.quote_string(&other.to_string()),
    }
}

/// Plain decimal or scientific notation, nothing the engine could read as an
/// identifier or expression
fn is_numeric_text(text: &str) -> bool {
    !text.is_empty()
        && text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        && text.parse::<f64>().is_ok()
}
