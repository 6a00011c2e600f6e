//! Mapping between Rust types and the JSON values held in the document.

use serde_json::Value;

use crate::types::ValueType;

/// A Rust type that a [`Setting`](crate::Setting) can hold.
///
/// Each implementor declares the JSON shape it is stored as, so the schema can
/// validate documents without knowing the Rust type behind a setting.
pub trait SettingValue: Sized {
    const VALUE_TYPE: ValueType;
    const NULLABLE: bool = false;
    /// Rust-facing name used in error messages (`"u16"`).
    const TYPE_NAME: &'static str;

    fn to_json(&self) -> Value;

    /// Reject values that have no faithful JSON form.
    fn representable(&self) -> Result<(), String> {
        Ok(())
    }

    /// `None` when the stored value does not have this type's shape.
    fn from_json(value: &Value) -> Option<Self>;
}

impl SettingValue for String {
    const VALUE_TYPE: ValueType = ValueType::String;
    const TYPE_NAME: &'static str = "string";

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl SettingValue for bool {
    const VALUE_TYPE: ValueType = ValueType::Boolean;
    const TYPE_NAME: &'static str = "bool";

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl SettingValue for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float;
    const TYPE_NAME: &'static str = "f64";

    /// Non-finite values have no JSON form and render as `null`; `set`
    /// refuses them through [`representable`](SettingValue::representable).
    fn to_json(&self) -> Value {
        serde_json::Number::from_f64(*self)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    fn representable(&self) -> Result<(), String> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(format!("{self} cannot be stored"))
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

macro_rules! integer_setting_value {
    ($($ty:ty),*) => {
        $(
            impl SettingValue for $ty {
                const VALUE_TYPE: ValueType = ValueType::Integer;
                const TYPE_NAME: &'static str = stringify!($ty);

                fn to_json(&self) -> Value {
                    Value::from(*self)
                }

                fn from_json(value: &Value) -> Option<Self> {
                    if let Some(i) = value.as_i64() {
                        return <$ty>::try_from(i).ok();
                    }
                    value.as_u64().and_then(|u| <$ty>::try_from(u).ok())
                }
            }
        )*
    };
}

integer_setting_value!(i32, i64, u16, u32, u64);

impl SettingValue for Vec<String> {
    const VALUE_TYPE: ValueType = ValueType::StringList;
    const TYPE_NAME: &'static str = "list of strings";

    fn to_json(&self) -> Value {
        Value::Array(self.iter().cloned().map(Value::String).collect())
    }

    fn from_json(value: &Value) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect()
    }
}

impl<T: SettingValue> SettingValue for Option<T> {
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;
    const NULLABLE: bool = true;
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn to_json(&self) -> Value {
        match self {
            Some(v) => v.to_json(),
            None => Value::Null,
        }
    }

    fn representable(&self) -> Result<(), String> {
        self.as_ref().map_or(Ok(()), T::representable)
    }

    fn from_json(value: &Value) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::from_json(value).map(Some)
    }
}

/// Whether `value` converts to `T`. Stored in a setting's definition so
/// document checks catch values the typed accessor would refuse.
pub(crate) fn fits<T: SettingValue>(value: &Value) -> bool {
    T::from_json(value).is_some()
}

/// Short description of a JSON value's shape for error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".into(),
        Value::Object(_) => "object".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_reject_out_of_range_values() {
        assert_eq!(u16::from_json(&json!(5050)), Some(5050));
        assert_eq!(u16::from_json(&json!(70000)), None);
        assert_eq!(u16::from_json(&json!(-1)), None);
        assert_eq!(i64::from_json(&json!(-1)), Some(-1));
    }

    #[test]
    fn fits_follows_the_rust_type() {
        assert!(fits::<u16>(&json!(5050)));
        assert!(!fits::<u16>(&json!(70000)));
        assert!(!fits::<u16>(&json!(-5)));
        assert!(fits::<i64>(&json!(-5)));
        assert!(fits::<Option<u16>>(&json!(null)));
    }

    #[test]
    fn non_finite_floats_are_not_representable() {
        assert!(1.5f64.representable().is_ok());
        assert!(f64::NAN.representable().is_err());
        assert!(Some(f64::INFINITY).representable().is_err());
        assert!(None::<f64>.representable().is_ok());
    }

    #[test]
    fn integers_reject_floats_and_strings() {
        assert_eq!(i64::from_json(&json!(1.5)), None);
        assert_eq!(i64::from_json(&json!("5")), None);
    }

    #[test]
    fn float_reads_integral_numbers() {
        assert_eq!(f64::from_json(&json!(3)), Some(3.0));
        assert_eq!(f64::from_json(&json!(0.1)), Some(0.1));
    }

    #[test]
    fn option_maps_null_to_none() {
        assert_eq!(Option::<String>::from_json(&json!(null)), Some(None));
        assert_eq!(
            Option::<String>::from_json(&json!("key")),
            Some(Some("key".to_string()))
        );
        assert_eq!(Option::<String>::from_json(&json!(3)), None);
        assert_eq!(None::<String>.to_json(), Value::Null);
    }

    #[test]
    fn option_inherits_value_type() {
        assert_eq!(<Option<u16>>::VALUE_TYPE, ValueType::Integer);
        assert!(<Option<u16>>::NULLABLE);
        assert!(!u16::NULLABLE);
    }

    #[test]
    fn string_list_requires_every_item_to_be_a_string() {
        assert_eq!(
            Vec::<String>::from_json(&json!(["imdbid", "rid"])),
            Some(vec!["imdbid".to_string(), "rid".to_string()])
        );
        assert_eq!(Vec::<String>::from_json(&json!(["imdbid", 2])), None);
    }

    #[test]
    fn describe_names_the_shape() {
        assert_eq!(describe(&json!("x")), "string \"x\"");
        assert_eq!(describe(&json!({})), "object");
    }
}
