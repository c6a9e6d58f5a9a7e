use std::fmt;

/// One captured scalar, tagged with the wire kind it arrived as.
///
/// The tag decides how the value renders: booleans always print
/// `true`/`false`, integers print base-10 with the kind's signedness. No
/// formatting decision is made before render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedValue {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    Bool(bool),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::I32(v) => write!(f, "{v}"),
            TypedValue::I64(v) => write!(f, "{v}"),
            TypedValue::U32(v) => write!(f, "{v}"),
            TypedValue::U64(v) => write!(f, "{v}"),
            TypedValue::Bool(v) => f.write_str(if *v { "true" } else { "false" }),
        }
    }
}
