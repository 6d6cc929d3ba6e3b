use paperstack_config::FieldKind;

/// A field value. The field set is open and schema-driven, so records carry a
/// name→value map of these instead of a fixed struct.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<String>),
}

impl FieldValue {
    /// Canonical string form, as written to the flat file. Lists are
    /// pipe-joined, booleans lowercased.
    pub fn text(&self) -> String {
        match self {
            Self::Str(s) => s.trim().to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::List(items) => items.join("|"),
        }
    }

    /// Empty means "not supplied": blank strings and empty lists. Numbers and
    /// booleans always count as supplied.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Str(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(_) | Self::Int(_) | Self::Float(_) => false,
        }
    }

    /// Truthiness used when one comparison side is a boolean.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Str(s) => !s.trim().is_empty(),
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Coerce raw file text into the schema's kind for the field.
    /// Unparseable numbers fall back to zero, mirroring lenient file intake.
    pub fn coerce(raw: &str, kind: FieldKind) -> FieldValue {
        let s = raw.trim();
        match kind {
            FieldKind::String => Self::Str(s.to_string()),
            FieldKind::Bool => {
                Self::Bool(matches!(s.to_lowercase().as_str(), "true" | "yes" | "1" | "on" | "y"))
            }
            FieldKind::Int => Self::Int(s.parse::<f64>().map(|f| f as i64).unwrap_or(0)),
            FieldKind::Float => Self::Float(s.parse::<f64>().unwrap_or(0.0)),
            FieldKind::List => Self::List(split_list(s)),
        }
    }
}

/// Split a list field. Canonical storage is pipe-joined; `;`-separated input
/// from older submission templates is still accepted.
pub fn split_list(raw: &str) -> Vec<String> {
    let seps: &[char] = if raw.contains('|') { &['|'] } else { &[';', '；'] };
    raw.split(seps)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
