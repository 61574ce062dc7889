//! A single row of a result stream: ordered field values accessible by index
//! or by the query's declared field name, plus the typed getters from
//! [`crate::value::coercion`] with a "was-null" flag tracked per read.

use crate::error::CoercionError;
use crate::value::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Record {
    keys: Arc<Vec<String>>,
    values: Vec<Value>,
    last_read_was_null: Option<bool>,
}

impl Record {
    pub fn new(keys: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        Record {
            keys,
            values,
            last_read_was_null: None,
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == name)
    }

    fn track(&mut self, value: &Value) {
        self.last_read_was_null = Some(value.is_null());
    }

    pub fn get(&mut self, index: usize) -> Option<&Value> {
        let value = self.values.get(index)?;
        self.last_read_was_null = Some(value.is_null());
        self.values.get(index)
    }

    pub fn get_by_name(&mut self, name: &str) -> Option<&Value> {
        let index = self.index_of(name)?;
        self.get(index)
    }

    /// Valid only immediately after a `get`/typed-getter call on this row;
    /// returns [`CoercionError::NoPriorRead`] otherwise.
    pub fn was_null(&self) -> Result<bool, CoercionError> {
        self.last_read_was_null.ok_or(CoercionError::NoPriorRead)
    }

    fn value_at(&mut self, index: usize) -> Result<Value, CoercionError> {
        let value = self
            .values
            .get(index)
            .cloned()
            .ok_or(CoercionError::Mismatch {
                from: "missing",
                to: "field",
            })?;
        self.track(&value);
        Ok(value)
    }

    pub fn get_bool(&mut self, index: usize) -> Result<bool, CoercionError> {
        self.value_at(index)?.coerce_bool()
    }

    pub fn get_i64(&mut self, index: usize) -> Result<i64, CoercionError> {
        self.value_at(index)?.coerce_i64()
    }

    pub fn get_i32(&mut self, index: usize) -> Result<i32, CoercionError> {
        self.value_at(index)?.coerce_i32()
    }

    pub fn get_i16(&mut self, index: usize) -> Result<i16, CoercionError> {
        self.value_at(index)?.coerce_i16()
    }

    pub fn get_i8(&mut self, index: usize) -> Result<i8, CoercionError> {
        self.value_at(index)?.coerce_i8()
    }

    pub fn get_f64(&mut self, index: usize) -> Result<f64, CoercionError> {
        self.value_at(index)?.coerce_f64()
    }

    pub fn get_string(&mut self, index: usize) -> Result<Option<String>, CoercionError> {
        self.value_at(index)?.coerce_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::new(
            Arc::new(vec!["a".into(), "b".into()]),
            vec![Value::Integer(1), Value::Null],
        )
    }

    #[test]
    fn field_access_by_name_and_index_agree() {
        let mut r = record();
        assert_eq!(r.get(0), Some(&Value::Integer(1)));
        assert_eq!(r.get_by_name("a"), Some(&Value::Integer(1)));
    }

    #[test]
    fn was_null_before_any_read_fails() {
        let r = record();
        assert!(r.was_null().is_err());
    }

    #[test]
    fn was_null_tracks_last_getter() {
        let mut r = record();
        assert_eq!(r.get_i64(1).unwrap(), 0);
        assert!(r.was_null().unwrap());
        assert_eq!(r.get_i64(0).unwrap(), 1);
        assert!(!r.was_null().unwrap());
    }
}
