//! Ordered name → position lookup shared by every keyed matrix.
//!
//! Buses and branches are identified by name, while the kernels work on
//! integer rows and columns. A [`NameIndex`] fixes the order once (the order
//! of the input sequence) and answers lookups both ways.

use crate::error::{GridError, GridResult};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl NameIndex {
    /// Index `names` in iteration order.
    ///
    /// `what` names the element type ("bus", "branch") in the error message.
    /// A repeated name makes the index ambiguous and is rejected as a
    /// configuration error.
    pub fn new<I, S>(names: I, what: &str) -> GridResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = NameIndex::default();
        for name in names {
            let name = name.into();
            if index.positions.contains_key(&name) {
                return Err(GridError::Configuration(format!(
                    "{what} name '{name}' appears more than once"
                )));
            }
            index.positions.insert(name.clone(), index.names.len());
            index.names.push(name);
        }
        Ok(index)
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn name(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.names.iter().enumerate().map(|(i, n)| (i, n.as_str()))
    }
}

impl Serialize for NameIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.names.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_positions_follow_input_order() {
        let index = NameIndex::new(["B3", "B1", "B2"], "bus").unwrap();
        assert_eq!(index.get("B3"), Some(0));
        assert_eq!(index.get("B2"), Some(2));
        assert_eq!(index.name(1), Some("B1"));
        assert_eq!(index.get("B4"), None);
        assert_eq!(index.len(), 3);
        assert!(index.contains("B1"));
        assert!(!index.contains("B4"));
        let pairs: Vec<_> = index.iter().collect();
        assert_eq!(pairs, vec![(0, "B3"), (1, "B1"), (2, "B2")]);
    }

    #[test]
    fn test_duplicate_name_is_configuration_error() {
        let err = NameIndex::new(["B1", "B2", "B1"], "bus").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("'B1'"));
    }

    #[test]
    fn test_serializes_as_name_list() {
        let index = NameIndex::new(vec!["a".to_string(), "b".to_string()], "bus").unwrap();
        assert_eq!(serde_json::to_string(&index).unwrap(), r#"["a","b"]"#);
    }
}
