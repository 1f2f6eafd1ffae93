//! Minimal typed accessors over a parsed `Value` tree, C8.
//!
//! `Record` being an ordered multimap means "the value of `foo`" is
//! ambiguous when `foo` repeats; these accessors resolve that the same
//! way hand-written call sites do: `get`/`try_get` answer "the first
//! one", `collect` answers "all of them".

use crate::error::{Error, Result};
use crate::value::{Date, Value};
use std::ops::Index;

impl Value {
    /// The first property named `name` in a `Record`. Fails if `self` is
    /// not a `Record` or no such property exists.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.try_get(name)
            .ok_or_else(|| Error::NotFound(format!("no property named {name:?}")))
    }

    /// As `get`, returning `None` instead of an error.
    pub fn try_get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(pairs) => pairs.iter().find(|(k, _)| &**k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Every value of a property named `name`, in order of appearance.
    pub fn collect(&self, name: &str) -> Vec<&Value> {
        match self {
            Value::Record(pairs) => pairs
                .iter()
                .filter(|(k, _)| &**k == name)
                .map(|(_, v)| v)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<Date> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&[(std::rc::Rc<str>, Value)]> {
        match self {
            Value::Record(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Iterates a `Record`'s keys paired with their values, or an
    /// `Array`'s elements paired with a stand-in empty key — lets callers
    /// walk either aggregate the same way when the shape is known to be
    /// "children of this node" rather than specifically one or the other.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Value::Record(pairs) => Box::new(pairs.iter().map(|(_, v)| v)),
            Value::Array(items) => Box::new(items.iter()),
            _ => Box::new(std::iter::empty()),
        }
    }
}

impl Index<&str> for Value {
    type Output = Value;

    /// Panics if `self` is not a `Record` or has no property named `index`.
    fn index(&self, index: &str) -> &Value {
        self.try_get(index)
            .unwrap_or_else(|| panic!("no property named {index:?}"))
    }
}

impl Index<usize> for Value {
    type Output = Value;

    /// Panics if `self` is not an `Array` or `index` is out of bounds.
    fn index(&self, index: usize) -> &Value {
        match self {
            Value::Array(items) => &items[index],
            _ => panic!("value is not an array"),
        }
    }
}

/// Keys present in every record of `records`, and keys present in at
/// least one but not all — the two halves of "find across repeated
/// blocks" that a single `get`/`collect` call can't answer for a set of
/// sibling records (e.g. several `country=` blocks with inconsistent
/// optional fields).
pub fn key_membership<'a>(records: &[&'a Value]) -> (Vec<&'a str>, Vec<&'a str>) {
    use std::collections::HashMap;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for record in records {
        let Value::Record(pairs) = record else {
            continue;
        };
        let mut seen_in_this_record = std::collections::HashSet::new();
        for (key, _) in pairs {
            if seen_in_this_record.insert(key.as_ref()) {
                if !counts.contains_key(key.as_ref()) {
                    order.push(key);
                }
                *counts.entry(key).or_insert(0) += 1;
            }
        }
    }

    let total = records.len();
    let mut in_all = Vec::new();
    let mut in_some = Vec::new();
    for key in order {
        if counts[key] == total {
            in_all.push(key);
        } else {
            in_some.push(key);
        }
    }
    (in_all, in_some)
}
