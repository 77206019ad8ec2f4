//! Call-time arguments.
//!
//! Each argument handed to the resolver carries its runtime shape: a scalar
//! rendered as text, a key-value mapping, or a structured JSON value. The
//! resolver checks that shape against the declared [`ParamRole`].
//!
//! [`ParamRole`]: crate::ParamRole

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use serde_json::Value;

/// The runtime value of one operation argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A scalar, already rendered as text.
    Text(String),
    /// A key-value mapping, rendered as text pairs.
    Map(Vec<(String, String)>),
    /// Structured JSON data.
    Json(Value),
}

impl Arg {
    /// A scalar argument from anything printable.
    #[must_use]
    pub fn text(value: impl fmt::Display) -> Self {
        Self::Text(value.to_string())
    }

    /// A mapping argument from key-value pairs.
    #[must_use]
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    /// A JSON argument from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> crate::Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Short name of the shape, for error messages.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Map(_) => "map",
            Self::Json(Value::Object(_)) => "JSON object",
            Self::Json(_) => "JSON value",
        }
    }
}

impl fmt::Display for Arg {
    /// The string representation used by path and query roles.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Json(Value::String(text)) => f.write_str(text),
            Self::Json(value) => write!(f, "{value}"),
            Self::Map(entries) => {
                f.write_str("{")?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Conversion of a Rust value into an [`Arg`].
///
/// Implemented for scalars, string types, maps and JSON values. Code
/// generated by `#[network_api]` calls it on every parameter.
pub trait ToArg {
    /// Convert into an argument.
    fn to_arg(&self) -> Arg;
}

impl<T: ToArg + ?Sized> ToArg for &T {
    fn to_arg(&self) -> Arg {
        (**self).to_arg()
    }
}

impl ToArg for Arg {
    fn to_arg(&self) -> Arg {
        self.clone()
    }
}

impl ToArg for str {
    fn to_arg(&self) -> Arg {
        Arg::Text(self.to_string())
    }
}

impl ToArg for String {
    fn to_arg(&self) -> Arg {
        Arg::Text(self.clone())
    }
}

macro_rules! impl_to_arg_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToArg for $ty {
                fn to_arg(&self) -> Arg {
                    Arg::text(self)
                }
            }
        )*
    };
}

impl_to_arg_display!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl<K, V, S> ToArg for HashMap<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
    S: BuildHasher,
{
    fn to_arg(&self) -> Arg {
        Arg::map(self.iter())
    }
}

impl<K, V> ToArg for BTreeMap<K, V>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn to_arg(&self) -> Arg {
        Arg::map(self.iter())
    }
}

impl ToArg for Value {
    fn to_arg(&self) -> Arg {
        Arg::Json(self.clone())
    }
}

impl ToArg for serde_json::Map<String, Value> {
    fn to_arg(&self) -> Arg {
        Arg::Json(Value::Object(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalars_render_as_text() {
        assert_eq!(42_u64.to_arg(), Arg::Text("42".to_string()));
        assert_eq!("abc".to_arg(), Arg::Text("abc".to_string()));
        assert_eq!(true.to_arg(), Arg::Text("true".to_string()));
        let owned = String::from("x");
        assert_eq!((&&owned).to_arg(), Arg::Text("x".to_string()));
    }

    #[test]
    fn maps_render_as_pairs() {
        let map = BTreeMap::from([("a", 1), ("b", 2)]);
        assert_eq!(
            map.to_arg(),
            Arg::Map(vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ])
        );
        assert_eq!(map.to_arg().to_string(), "{a=1, b=2}");
    }

    #[test]
    fn json_shapes() {
        assert_eq!(json!({"a": 1}).to_arg().shape(), "JSON object");
        assert_eq!(json!([1, 2]).to_arg().shape(), "JSON value");
        assert_eq!(json!("text").to_arg().to_string(), "text");
        assert_eq!(json!([1, 2]).to_arg().to_string(), "[1,2]");
    }

    #[test]
    fn json_from_serialize() {
        #[derive(serde::Serialize)]
        struct Login<'a> {
            user: &'a str,
        }

        let arg = Arg::json(&Login { user: "bob" }).expect("serialize");
        assert_eq!(arg, Arg::Json(json!({"user": "bob"})));
    }
}
