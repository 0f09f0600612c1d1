use std::cell::{
    Ref,
    RefCell
};
use std::fs::File;
use std::io::BufReader;

use serde::{
    Deserialize,
    Serialize
};
use tracing::debug;

use super::managererror::ManagerError;

#[derive(Clone, Serialize, Deserialize)]
struct NamedJsonObject {
    name: String
}

/// Named objects built from JSON, kept in insertion order.
///
/// Loading happens once at startup; afterwards the manager is only read.
pub trait IManager<V> where
    V: Clone {
    fn entries(&self) -> Ref<'_, Vec<(String, V)>>;

    fn insert(&self, name: String, value: V) -> Result<(), ManagerError>;

    /// Parses one named object without touching the stored entries.
    fn build_obj_from_json(&self, json_value: serde_json::Value) -> Result<(String, V), ManagerError>;

    fn contains(&self, name: &str) -> bool {
        self.entries().iter().any(|(key, _)| key == name)
    }

    fn insert_obj_from_json(&self, json_value: serde_json::Value) -> Result<(), ManagerError> {
        let (name, value) = self.build_obj_from_json(json_value)?;
        self.insert(name, value)
    }

    fn get(&self, name: &str) -> Result<V, ManagerError> {
        self.entries()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ManagerError::map_elem_not_found(name))
    }

    fn get_index(&self, index: usize) -> Result<V, ManagerError> {
        let entries = self.entries();
        entries
            .get(index)
            .map(|(_, value)| value.clone())
            .ok_or(ManagerError::IndexOutOfRange { index, len: entries.len() })
    }

    fn names(&self) -> Vec<String> {
        self.entries().iter().map(|(key, _)| key.clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Builds every object before inserting any; a failure leaves the manager unchanged.
    fn build_obj_from_json_vec(&self, json_vec: &[serde_json::Value]) -> Result<Vec<(String, V)>, ManagerError> {
        let mut built: Vec<(String, V)> = Vec::with_capacity(json_vec.len());
        for j in json_vec.iter() {
            let (name, value) = self.build_obj_from_json(j.clone())?;
            if self.contains(&name) || built.iter().any(|(key, _)| *key == name) {
                return Err(ManagerError::DuplicateName(name));
            }
            built.push((name, value));
        }
        Ok(built)
    }

    fn insert_obj_from_json_vec(&self, json_vec: &[serde_json::Value]) -> Result<(), ManagerError> {
        for (name, value) in self.build_obj_from_json_vec(json_vec)? {
            self.insert(name, value)?;
        }
        Ok(())
    }

    fn from_json_value(&self, json_value: serde_json::Value) -> Result<(), ManagerError> {
        if json_value.is_array() {
            let json_array: Vec<serde_json::Value> = ManagerError::from_json_or_json_parse_error(json_value)?;
            self.insert_obj_from_json_vec(&json_array)
        } else {
            self.insert_obj_from_json(json_value)
        }
    }

    fn from_reader(&self, file_path: String) -> Result<(), ManagerError> {
        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let json_value: serde_json::Value = serde_json::from_reader(reader)?;
        self.from_json_value(json_value)?;
        debug!(path = %file_path, entries = self.len(), "manager loaded");
        Ok(())
    }
}


pub struct Manager<V> {
    entries_cell: RefCell<Vec<(String, V)>>,
    get_obj_from_json: fn(serde_json::Value) -> Result<V, ManagerError>
}


impl <V> Manager<V> where
    V: Clone {
    pub fn new(get_obj_from_json: fn(serde_json::Value) -> Result<V, ManagerError>) -> Manager<V> {
        Manager { entries_cell: RefCell::new(Vec::new()), get_obj_from_json }
    }
}

impl <V> IManager<V> for Manager<V> where
    V: Clone {
    fn entries(&self) -> Ref<'_, Vec<(String, V)>> {
        self.entries_cell.borrow()
    }

    fn insert(&self, name: String, value: V) -> Result<(), ManagerError> {
        let mut entries = self.entries_cell.borrow_mut();
        if entries.iter().any(|(key, _)| *key == name) {
            return Err(ManagerError::DuplicateName(name));
        }
        entries.push((name, value));
        Ok(())
    }

    fn build_obj_from_json(&self, json_value: serde_json::Value) -> Result<(String, V), ManagerError> {
        let named_object: NamedJsonObject = ManagerError::from_json_or_json_parse_error(json_value.clone())?;
        let v = (self.get_obj_from_json)(json_value)?;
        Ok((named_object.name, v))
    }
}
