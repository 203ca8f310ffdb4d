use std::collections::HashMap;
use serde::Serialize;

/// How a raw `label: value` string is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain number (`2500`, `1280`, `29.97`)
    Number,
    /// Frame-rate style `num/den` pair (`30/1`, `30000/1001`); a bare integer
    /// is read as `n/1`
    Ratio,
    /// Kept verbatim
    Text,
}

/// A field the caller wants from a settings block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn number(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Number }
    }

    pub const fn ratio(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Ratio }
    }

    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text }
    }
}

/// Integer `num/den` pair. Never pre-divided, so `30000/1001` keeps its
/// exact value until the final computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ratio {
    pub num: u64,
    pub den: u64,
}

impl Ratio {
    pub const fn new(num: u64, den: u64) -> Self {
        Self { num, den }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.split_once('/') {
            Some((num, den)) => Some(Self {
                num: num.trim().parse().ok()?,
                den: den.trim().parse().ok()?,
            }),
            None => Some(Self { num: raw.parse().ok()?, den: 1 }),
        }
    }

    /// `None` for a zero denominator.
    pub fn as_f64(&self) -> Option<f64> {
        if self.den == 0 {
            None
        } else {
            Some(self.num as f64 / self.den as f64)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Ratio(Ratio),
    Text(String),
}

impl FieldValue {
    pub fn coerce(raw: &str, kind: FieldKind) -> Option<Self> {
        match kind {
            FieldKind::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FieldValue::Number),
            FieldKind::Ratio => Ratio::parse(raw).map(FieldValue::Ratio),
            FieldKind::Text => Some(FieldValue::Text(raw.trim().to_string())),
        }
    }
}

/// Fields read from one settings block.
///
/// An empty record (no header found) means the block does not apply to this
/// log; callers treat it as "not applicable", never as a failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredRecord {
    header_index: Option<usize>,
    fields: HashMap<String, FieldValue>,
}

impl StructuredRecord {
    pub(crate) fn found_at(header_index: usize) -> Self {
        Self {
            header_index: Some(header_index),
            fields: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    /// True when no header was found.
    pub fn is_empty(&self) -> bool {
        self.header_index.is_none()
    }

    /// Line index of the header this record was read from.
    pub fn header_index(&self) -> Option<usize> {
        self.header_index
    }

    /// Number of fields that were found and coerced.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(FieldValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.number(name).unwrap_or(default)
    }

    pub fn ratio(&self, name: &str) -> Option<Ratio> {
        match self.fields.get(name) {
            Some(FieldValue::Ratio(r)) => Some(*r),
            _ => None,
        }
    }

    pub fn ratio_or(&self, name: &str, default: Ratio) -> Ratio {
        self.ratio(name).unwrap_or(default)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}
