//! Literal evaluation (§4.3 const-eval pass): resolves a lexical
//! `LiteralValue` against the base type that will actually consume it,
//! checking range and producing the canonical `ConstValue` the IR stores.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::ir::ConstValue;
use crate::span::Span;
use crate::token::{BaseType, LiteralValue};

fn int_range(base: BaseType) -> (i128, i128) {
    use BaseType::*;
    match base {
        Byte => (0, u8::MAX as i128),
        Int16 => (i16::MIN as i128, i16::MAX as i128),
        UInt16 => (0, u16::MAX as i128),
        Int32 => (i32::MIN as i128, i32::MAX as i128),
        UInt32 => (0, u32::MAX as i128),
        Int64 => (i64::MIN as i128, i64::MAX as i128),
        UInt64 => (0, u64::MAX as i128),
        Date => (i64::MIN as i128, i64::MAX as i128),
        _ => (0, 0),
    }
}

/// Parses an `Integer` literal's digits into a signed 128-bit value, wide
/// enough to hold any scalar integer type before range-checking it.
pub fn parse_int(lit: &LiteralValue, span: Span) -> Result<i128, Diagnostic> {
    match lit {
        LiteralValue::Integer { digits, negative, radix } => {
            let magnitude = i128::from_str_radix(digits, *radix).map_err(|_| {
                Diagnostic::new(DiagnosticKind::ConstOutOfRange, span, format!("`{digits}` does not fit in a 128-bit integer"))
            })?;
            Ok(if *negative { -magnitude } else { magnitude })
        }
        _ => Err(Diagnostic::new(DiagnosticKind::ConstTypeMismatch { expected: "an integer".to_string() }, span, "expected an integer literal")),
    }
}

/// Parses and range-checks an integer literal meant for a small fixed-width
/// position (a message field index or union discriminator), both of which
/// are `0..=255` in the wire format.
pub fn parse_u8(lit: &LiteralValue, span: Span) -> Result<u8, Diagnostic> {
    let value = parse_int(lit, span)?;
    if !(0..=255).contains(&value) {
        return Err(Diagnostic::new(DiagnosticKind::FieldIndexOutOfRange { index: value as i64 }, span, format!("{value} is outside 0..=255")));
    }
    Ok(value as u8)
}

fn parse_guid(s: &str, span: Span) -> Result<[u8; 16], Diagnostic> {
    let bytes = parse_guid_bytes(s).ok_or_else(|| {
        Diagnostic::new(DiagnosticKind::InvalidGuid, span, format!("`{s}` is not a canonical GUID"))
    })?;
    Ok(bytes)
}

fn parse_guid_bytes(s: &str) -> Option<[u8; 16]> {
    let groups: Vec<&str> = s.split('-').collect();
    if groups.len() != 5 || [8, 4, 4, 4, 12] != groups.iter().map(|g| g.len()).collect::<Vec<_>>().as_slice() {
        return None;
    }
    let joined: String = groups.concat();
    let mut out = [0u8; 16];
    for i in 0..16 {
        out[i] = u8::from_str_radix(&joined[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(out)
}

/// Resolves a literal against the base type that declares it (a `const`'s
/// type, or an attribute value's expected shape), producing `ConstTypeMismatch`,
/// `ConstOutOfRange`, or `InvalidGuid` as appropriate.
pub fn eval_const_value(lit: &LiteralValue, target: BaseType, span: Span) -> Result<ConstValue, Diagnostic> {
    use BaseType::*;
    match target {
        Bool => match lit {
            LiteralValue::Bool(b) => Ok(ConstValue::Bool(*b)),
            _ => Err(Diagnostic::new(DiagnosticKind::ConstTypeMismatch { expected: "bool".into() }, span, "expected a boolean literal")),
        },
        Byte | Int16 | UInt16 | Int32 | UInt32 | Int64 | UInt64 | Date => {
            let value = parse_int(lit, span)?;
            let (lo, hi) = int_range(target);
            if value < lo || value > hi {
                return Err(Diagnostic::new(DiagnosticKind::ConstOutOfRange, span, format!("{value} does not fit in {target:?}")));
            }
            Ok(if target.is_signed() { ConstValue::Int(value as i64) } else { ConstValue::UInt(value as u64) })
        }
        Float32 | Float64 => match lit {
            LiteralValue::Float(text) => Ok(ConstValue::Float(parse_float(text))),
            LiteralValue::Integer { .. } => Ok(ConstValue::Float(parse_int(lit, span)? as f64)),
            _ => Err(Diagnostic::new(DiagnosticKind::ConstTypeMismatch { expected: "a float".into() }, span, "expected a float literal")),
        },
        String => match lit {
            LiteralValue::String(s) => Ok(ConstValue::String(s.clone())),
            _ => Err(Diagnostic::new(DiagnosticKind::ConstTypeMismatch { expected: "string".into() }, span, "expected a string literal")),
        },
        Guid => match lit {
            LiteralValue::String(s) => Ok(ConstValue::Guid(parse_guid(s, span)?)),
            _ => Err(Diagnostic::new(DiagnosticKind::ConstTypeMismatch { expected: "a GUID string".into() }, span, "expected a GUID literal")),
        },
    }
}

fn parse_float(text: &str) -> f64 {
    match text {
        "inf" => f64::INFINITY,
        "-inf" => f64::NEG_INFINITY,
        "nan" => f64::NAN,
        other => other.parse().unwrap_or(f64::NAN),
    }
}

/// Converts a literal to a `ConstValue` without a target type to check it
/// against, for generic attribute values where the attribute's schema isn't
/// known to the core (e.g. `[deprecated("reason")]`).
pub fn literal_to_const_value_untyped(lit: &LiteralValue) -> Option<ConstValue> {
    match lit {
        LiteralValue::Bool(b) => Some(ConstValue::Bool(*b)),
        LiteralValue::Integer { .. } => {
            let dummy_span = Span::point(crate::span::FileId(0), 0);
            parse_int(lit, dummy_span).ok().map(|v| ConstValue::Int(v as i64))
        }
        LiteralValue::Float(text) => Some(ConstValue::Float(parse_float(text))),
        LiteralValue::String(s) => Some(ConstValue::String(s.clone())),
        LiteralValue::Guid(s) => parse_guid_bytes(s).map(ConstValue::Guid),
    }
}
