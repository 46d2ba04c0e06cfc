use std::collections::HashMap;

use cql_ast::Value;

use crate::error::EvalError;

/// The session's variable store: a name → value-sequence mapping.
///
/// Names are stored without the `@` sigil. Reading past the end of a
/// sequence yields `Value::Invalid`; that sentinel is how iteration
/// over a variable terminates.
#[derive(Debug, Default)]
pub struct VariableStore {
    variables: HashMap<String, Vec<Value>>,
}

impl VariableStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        VariableStore::default()
    }

    /// Binds a variable, overwriting any previous value.
    pub fn set(&mut self, name: impl Into<String>, values: Vec<Value>) {
        self.variables.insert(name.into(), values);
    }

    /// The full sequence of a variable, if bound.
    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.variables.get(name).map(Vec::as_slice)
    }

    /// Reads one element of a variable; past-the-end reads give
    /// `Invalid`, an unknown variable is an error.
    pub fn fetch(&self, name: &str, idx: usize) -> Result<Value, EvalError> {
        let values = self
            .variables
            .get(name)
            .ok_or_else(|| EvalError::UnknownVariable(name.to_string()))?;
        Ok(values.get(idx).cloned().unwrap_or(Value::Invalid))
    }

    /// Appends one value to a variable, creating it if needed. This is
    /// the `dest` clause's write path.
    pub fn append(&mut self, name: &str, value: Value) {
        self.variables.entry(name.to_string()).or_default().push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_past_the_end_is_invalid() {
        let mut vars = VariableStore::new();
        vars.set("x", vec![Value::Float(1.0)]);
        assert_eq!(vars.fetch("x", 0), Ok(Value::Float(1.0)));
        assert_eq!(vars.fetch("x", 1), Ok(Value::Invalid));
        assert!(matches!(
            vars.fetch("y", 0),
            Err(EvalError::UnknownVariable(_))
        ));
    }

    #[test]
    fn append_creates_on_demand() {
        let mut vars = VariableStore::new();
        vars.append("fresh", Value::Float(1.0));
        assert_eq!(vars.get("fresh"), Some(&[Value::Float(1.0)][..]));
    }
}
