//! variable resolution
//!
//! the evaluator asks a [`Resolver`] for each identifier as it reaches it,
//! once per occurrence, left to right. `None` and [`DynamicValue::Nil`] mean
//! the same thing.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use super::value::{Value, ValueKind};

/// a value handed over by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Nil,
    Bool(bool),
    Float(f64),
    Int(i64),
    UInt(u64),
    Str(String),
    Bytes(Vec<u8>),
    /// display text of a value of any other kind; classified on conversion
    Other(String),
}

impl DynamicValue {
    /// convert into an evaluator value carrying `name` for diagnostics
    pub fn into_value(self, name: &str) -> Value {
        let value = match self {
            DynamicValue::Nil => Value::nil(),
            DynamicValue::Bool(b) => Value::boolean(b),
            DynamicValue::Float(f) => Value::number(f),
            DynamicValue::Int(i) => Value::number(i as f64),
            DynamicValue::UInt(u) => Value::number(u as f64),
            DynamicValue::Str(s) => Value::string(s),
            DynamicValue::Bytes(b) => Value::string(String::from_utf8_lossy(&b).into_owned()),
            DynamicValue::Other(text) => classify_text(text),
        };
        value.named(name)
    }

    /// classify free-form text (e.g. a `--var` argument) like an unknown value
    pub fn parse(text: impl Into<String>) -> Self {
        DynamicValue::Other(text.into())
    }
}

/// number first, then boolean, else plain string
fn classify_text(text: String) -> Value {
    if let Ok(n) = text.parse::<f64>() {
        return Value::number(n);
    }
    if let Some(b) = parse_bool(&text) {
        return Value::boolean(b);
    }
    Value::string(text)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

macro_rules! from_int {
    ($variant:ident, $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for DynamicValue {
                fn from(v: $t) -> Self {
                    DynamicValue::$variant(v as $target)
                }
            }
        )*
    };
}

from_int!(Int, i64: i8, i16, i32, i64, isize);
from_int!(UInt, u64: u8, u16, u32, u64, usize);

impl From<f32> for DynamicValue {
    fn from(v: f32) -> Self {
        DynamicValue::Float(f64::from(v))
    }
}

impl From<f64> for DynamicValue {
    fn from(v: f64) -> Self {
        DynamicValue::Float(v)
    }
}

impl From<bool> for DynamicValue {
    fn from(v: bool) -> Self {
        DynamicValue::Bool(v)
    }
}

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        DynamicValue::Str(v.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(v: String) -> Self {
        DynamicValue::Str(v)
    }
}

impl From<Vec<u8>> for DynamicValue {
    fn from(v: Vec<u8>) -> Self {
        DynamicValue::Bytes(v)
    }
}

impl From<&[u8]> for DynamicValue {
    fn from(v: &[u8]) -> Self {
        DynamicValue::Bytes(v.to_vec())
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DynamicValue::Nil, Into::into)
    }
}

impl From<&serde_json::Value> for DynamicValue {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => DynamicValue::Nil,
            serde_json::Value::Bool(b) => DynamicValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DynamicValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    DynamicValue::UInt(u)
                } else {
                    DynamicValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => DynamicValue::Str(s.clone()),
            other => DynamicValue::Other(other.to_string()),
        }
    }
}

impl From<serde_json::Value> for DynamicValue {
    fn from(v: serde_json::Value) -> Self {
        DynamicValue::from(&v)
    }
}

impl From<&Value> for DynamicValue {
    fn from(v: &Value) -> Self {
        match v.kind() {
            ValueKind::Nil => DynamicValue::Nil,
            ValueKind::Boolean(b) => DynamicValue::Bool(*b),
            ValueKind::Number(n) => DynamicValue::Float(*n),
            ValueKind::String(s) => DynamicValue::Str(s.clone()),
            ValueKind::Error(e) => DynamicValue::Str(e.to_string()),
        }
    }
}

/// source of variable values for one execution
pub trait Resolver {
    /// look up a variable; `None` is treated as nil
    fn get(&self, name: &str) -> Option<DynamicValue>;

    /// look up a variable as an evaluator value
    fn resolve(&self, name: &str) -> Value {
        self.get(name)
            .unwrap_or(DynamicValue::Nil)
            .into_value(name)
    }
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn get(&self, name: &str) -> Option<DynamicValue> {
        (**self).get(name)
    }

    fn resolve(&self, name: &str) -> Value {
        (**self).resolve(name)
    }
}

impl<R: Resolver + ?Sized> Resolver for Box<R> {
    fn get(&self, name: &str) -> Option<DynamicValue> {
        (**self).get(name)
    }

    fn resolve(&self, name: &str) -> Value {
        (**self).resolve(name)
    }
}

/// resolves nothing: every variable is nil
impl Resolver for () {
    fn get(&self, _name: &str) -> Option<DynamicValue> {
        None
    }
}

impl<V, S> Resolver for HashMap<String, V, S>
where
    V: Clone + Into<DynamicValue>,
    S: BuildHasher,
{
    fn get(&self, name: &str) -> Option<DynamicValue> {
        HashMap::get(self, name).cloned().map(Into::into)
    }
}

impl<V> Resolver for BTreeMap<String, V>
where
    V: Clone + Into<DynamicValue>,
{
    fn get(&self, name: &str) -> Option<DynamicValue> {
        BTreeMap::get(self, name).cloned().map(Into::into)
    }
}

impl Resolver for serde_json::Map<String, serde_json::Value> {
    fn get(&self, name: &str) -> Option<DynamicValue> {
        serde_json::Map::get(self, name).map(DynamicValue::from)
    }
}

/// objects resolve their keys; any other JSON value resolves nothing
impl Resolver for serde_json::Value {
    fn get(&self, name: &str) -> Option<DynamicValue> {
        self.as_object()
            .and_then(|map| map.get(name))
            .map(DynamicValue::from)
    }
}

/// adapts a closure into a [`Resolver`]
#[derive(Debug, Clone, Copy)]
pub struct FnResolver<F>(pub F);

impl<F> Resolver for FnResolver<F>
where
    F: Fn(&str) -> Option<DynamicValue>,
{
    fn get(&self, name: &str) -> Option<DynamicValue> {
        (self.0)(name)
    }
}

/// default resolver: values converted once up front, looked up by name
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: HashMap<String, Value>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<DynamicValue>) {
        let name = name.into();
        let value = value.into().into_value(&name);
        self.values.insert(name, value);
    }

    /// builder form of [`MapResolver::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Resolver for MapResolver {
    fn get(&self, name: &str) -> Option<DynamicValue> {
        self.values.get(name).map(DynamicValue::from)
    }

    fn resolve(&self, name: &str) -> Value {
        self.values
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::nil().named(name))
    }
}

impl<K, V> FromIterator<(K, V)> for MapResolver
where
    K: Into<String>,
    V: Into<DynamicValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut resolver = MapResolver::new();
        for (name, value) in iter {
            resolver.insert(name, value);
        }
        resolver
    }
}

impl<K, V> Extend<(K, V)> for MapResolver
where
    K: Into<String>,
    V: Into<DynamicValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}
