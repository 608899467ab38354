//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Conversion between argument containers and typed values.

use super::ArgsError;
use crate::wamp::{Dict, Value};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Number;

/// Types that can be decoded from a positional argument list.
///
/// Implemented for tuples of up to eight [`DeserializeOwned`] elements, where
/// each tuple element consumes one argument and the arity must match
/// exactly, and for `Vec<T>`, which accepts any number of arguments of the
/// same type.
///
/// Numbers convert between forms: a float without a fractional part, such
/// as `1.0`, decodes into integer types at any depth, and integers decode
/// into float types.
pub trait FromArgs: Sized {
    /// Decodes `args` into `Self`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgsError::Arity`] when the list has the wrong length and
    /// [`ArgsError::Argument`] naming the first element that fails to decode.
    fn from_args(args: &[Value]) -> Result<Self, ArgsError>;
}

fn check_arity(args: &[Value], expected: usize) -> Result<(), ArgsError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ArgsError::Arity {
            expected,
            actual: args.len(),
        })
    }
}

/// Converts a float that has no fractional part and fits an `i64`.
fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then(|| f as i64)
}

fn integral_float(number: &Number) -> Option<i64> {
    if number.is_f64() {
        number.as_f64().and_then(integral)
    } else {
        None
    }
}

fn has_integral_float(value: &Value) -> bool {
    match value {
        Value::Number(number) => integral_float(number).is_some(),
        Value::Array(items) => items.iter().any(has_integral_float),
        Value::Object(entries) => entries.values().any(has_integral_float),
        _ => false,
    }
}

/// Rewrites integral floats as integers, recursively.
fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Number(number) => {
            if let Some(n) = integral_float(number) {
                *value = Value::from(n);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(entries) => entries.values_mut().for_each(normalize_numbers),
        _ => {}
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, serde_json::Error> {
    if has_integral_float(value) {
        let mut owned = value.clone();
        normalize_numbers(&mut owned);
        T::deserialize(owned)
    } else {
        T::deserialize(value)
    }
}

fn decode_at<T: DeserializeOwned>(args: &[Value], index: usize) -> Result<T, ArgsError> {
    decode(&args[index]).map_err(|source| ArgsError::Argument { index, source })
}

impl FromArgs for () {
    fn from_args(args: &[Value]) -> Result<Self, ArgsError> {
        check_arity(args, 0)
    }
}

impl<T: DeserializeOwned> FromArgs for Vec<T> {
    fn from_args(args: &[Value]) -> Result<Self, ArgsError> {
        (0..args.len()).map(|index| decode_at(args, index)).collect()
    }
}

macro_rules! tuple_from_args {
    ($len:expr => $($name:ident : $idx:tt),+) => {
        impl<$($name: DeserializeOwned),+> FromArgs for ($($name,)+) {
            fn from_args(args: &[Value]) -> Result<Self, ArgsError> {
                check_arity(args, $len)?;
                Ok(($(decode_at::<$name>(args, $idx)?,)+))
            }
        }
    };
}

tuple_from_args!(1 => A: 0);
tuple_from_args!(2 => A: 0, B: 1);
tuple_from_args!(3 => A: 0, B: 1, C: 2);
tuple_from_args!(4 => A: 0, B: 1, C: 2, D: 3);
tuple_from_args!(5 => A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_from_args!(6 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
tuple_from_args!(7 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
tuple_from_args!(8 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

/// Decodes a positional argument list.
///
/// # Example
///
/// ```rust
/// use wamprpc::codec::unpack;
/// use serde_json::json;
///
/// let args = vec![json!("foo"), json!(1), json!([1, 2, 3])];
/// let (name, id, values): (String, i64, Vec<u8>) = unpack(&args).unwrap();
/// assert_eq!(name, "foo");
/// assert_eq!(id, 1);
/// assert_eq!(values, vec![1, 2, 3]);
/// ```
///
/// # Errors
///
/// See [`FromArgs::from_args`].
pub fn unpack<T: FromArgs>(args: &[Value]) -> Result<T, ArgsError> {
    T::from_args(args)
}

/// Decodes keyword arguments into a struct.
///
/// Keys are matched to fields by name or by `#[serde(rename = "...")]`.
/// Fields are required unless they are `Option<_>` or carry
/// `#[serde(default)]`; `#[serde(skip)]` leaves a field untouched and keys
/// without a matching field are ignored. Numbers convert as described on
/// [`FromArgs`].
///
/// # Example
///
/// ```rust
/// use wamprpc::codec::unpack_dict;
/// use wamprpc::wamp::Dict;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct Complex {
///     #[serde(rename = "arg_1")]
///     arg1: i64,
///     value: String,
///     #[serde(default)]
///     note: Option<String>,
/// }
///
/// let mut kwargs = Dict::new();
/// kwargs.insert("arg_1".into(), json!(7));
/// kwargs.insert("value".into(), json!("x"));
/// let complex: Complex = unpack_dict(&kwargs).unwrap();
/// assert_eq!(complex.arg1, 7);
/// assert!(complex.note.is_none());
/// ```
///
/// # Errors
///
/// Returns [`ArgsError::Keywords`] when a required key is missing or a value
/// has the wrong type.
pub fn unpack_dict<T: DeserializeOwned>(kwargs: &Dict) -> Result<T, ArgsError> {
    let mut value = Value::Object(kwargs.clone());
    normalize_numbers(&mut value);
    T::deserialize(value).map_err(|source| ArgsError::Keywords { source })
}

/// Encodes a tuple or sequence as a positional argument list.
///
/// `()` packs to an empty list.
///
/// # Errors
///
/// Returns [`ArgsError::NotAList`] if `value` does not serialize to a
/// sequence.
pub fn pack<T: Serialize + ?Sized>(value: &T) -> Result<Vec<Value>, ArgsError> {
    match serde_json::to_value(value).map_err(|source| ArgsError::Encode { source })? {
        Value::Array(list) => Ok(list),
        Value::Null => Ok(Vec::new()),
        _ => Err(ArgsError::NotAList),
    }
}

/// Encodes a struct or map as keyword arguments.
///
/// # Errors
///
/// Returns [`ArgsError::NotADict`] if `value` does not serialize to a map.
pub fn pack_dict<T: Serialize + ?Sized>(value: &T) -> Result<Dict, ArgsError> {
    match serde_json::to_value(value).map_err(|source| ArgsError::Encode { source })? {
        Value::Object(dict) => Ok(dict),
        Value::Null => Ok(Dict::new()),
        _ => Err(ArgsError::NotADict),
    }
}

/// Reads an integer, accepting floats that carry no fraction.
#[must_use]
pub fn as_i64(value: &Value) -> Option<i64> {
    let number = value.as_number()?;
    number.as_i64().or_else(|| integral_float(number))
}

/// Reads a string.
#[must_use]
pub fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_unpack_simple() {
        let args = vec![
            json!("foo"),
            json!(1),
            json!([1, 2, 3]),
            json!(["foo", "bar"]),
            json!({"a": "b", "c": "d"}),
        ];
        let (s, i, li, ls, ms): (
            String,
            i32,
            Vec<i32>,
            Vec<String>,
            HashMap<String, String>,
        ) = unpack(&args).unwrap();
        assert_eq!(s, "foo");
        assert_eq!(i, 1);
        assert_eq!(li, vec![1, 2, 3]);
        assert_eq!(ls, vec!["foo".to_string(), "bar".to_string()]);
        assert_eq!(ms.get("a").map(String::as_str), Some("b"));
        assert_eq!(ms.len(), 2);
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Named {
        #[serde(rename = "string-field")]
        string_field: String,
        #[serde(rename = "float-field")]
        float_field: f64,
        #[serde(rename = "int-field")]
        int_field: i32,
        #[serde(rename = "ImplicitName")]
        implicit_name: i32,
    }

    #[test]
    fn test_unpack_list_to_struct() {
        let args = vec![json!({
            "string-field": "b",
            "float-field": 0.2,
            "int-field": 1,
            "ImplicitName": 2,
        })];
        let (named,): (Named,) = unpack(&args).unwrap();
        assert_eq!(
            named,
            Named {
                string_field: "b".into(),
                float_field: 0.2,
                int_field: 1,
                implicit_name: 2,
            }
        );
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct WithOptional {
        #[serde(rename = "int-field")]
        int_field: i32,
        #[serde(default)]
        unused_field: Option<Value>,
        #[serde(skip)]
        ignored_field: i32,
        #[serde(rename = "optional-field", default)]
        optional_field: i64,
    }

    #[test]
    fn test_unpack_dict_to_struct() {
        let mut kwargs = Dict::new();
        kwargs.insert("int-field".into(), json!(1));
        kwargs.insert("no-matching-field".into(), json!(123));
        kwargs.insert("ignored_field".into(), json!(111));
        kwargs.insert("optional-field".into(), json!(-1));

        let decoded: WithOptional = unpack_dict(&kwargs).unwrap();
        assert_eq!(
            decoded,
            WithOptional {
                int_field: 1,
                unused_field: None,
                ignored_field: 0,
                optional_field: -1,
            }
        );
    }

    #[test]
    fn test_unpack_dict_missing_required_key() {
        let kwargs = Dict::new();
        let err = unpack_dict::<WithOptional>(&kwargs).unwrap_err();
        assert!(matches!(err, ArgsError::Keywords { .. }));
        assert!(err.to_string().contains("int-field"));
    }

    #[test]
    fn test_unpack_wrong_arity() {
        let args = vec![json!(1), json!(2)];
        let err = unpack::<(i64,)>(&args).unwrap_err();
        assert!(matches!(
            err,
            ArgsError::Arity {
                expected: 1,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_unpack_names_failing_argument() {
        let args = vec![json!("ok"), json!("not a number")];
        let err = unpack::<(String, i64)>(&args).unwrap_err();
        assert_eq!(err.index(), Some(1));
    }

    #[test]
    fn test_unpack_homogeneous_vec() {
        let args: Vec<Value> = (1..=10).map(|n| json!(n)).collect();
        let numbers: Vec<i64> = unpack(&args).unwrap();
        assert_eq!(numbers.iter().sum::<i64>(), 55);
    }

    #[test]
    fn test_integral_floats_decode_as_integers() {
        let args = vec![json!(1.0), json!([2.0, 3]), json!({"n": 4.0}), json!(5)];
        let (a, b, c, d): (i64, Vec<u8>, HashMap<String, u32>, f64) = unpack(&args).unwrap();
        assert_eq!((a, b, c["n"], d), (1, vec![2, 3], 4, 5.0));

        let mut kwargs = Dict::new();
        kwargs.insert("int-field".into(), json!(7.0));
        let decoded: WithOptional = unpack_dict(&kwargs).unwrap();
        assert_eq!(decoded.int_field, 7);

        // A fraction is still an error.
        let err = unpack::<(i64,)>(&[json!(1.5)]).unwrap_err();
        assert_eq!(err.index(), Some(0));
    }

    #[test]
    fn test_pack_tuple_and_unit() {
        assert_eq!(pack(&("a", 1)).unwrap(), vec![json!("a"), json!(1)]);
        assert!(pack(&()).unwrap().is_empty());
        assert!(matches!(pack(&5), Err(ArgsError::NotAList)));
    }

    #[test]
    fn test_pack_dict() {
        #[derive(serde::Serialize)]
        struct Out {
            total: u32,
        }
        let dict = pack_dict(&Out { total: 3 }).unwrap();
        assert_eq!(dict.get("total"), Some(&json!(3)));
        assert!(matches!(pack_dict(&[1, 2]), Err(ArgsError::NotADict)));
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(as_i64(&json!(55)), Some(55));
        assert_eq!(as_i64(&json!(55.0)), Some(55));
        assert_eq!(as_i64(&json!(55.5)), None);
        assert_eq!(as_i64(&json!("55")), None);
        assert_eq!(as_str(&json!("Alpha")), Some("Alpha"));
    }
}
