use std::collections::BTreeMap;

use serde_json::Value;

use super::error::ModemError;

/// A named bundle of codec parameters.
///
/// The parameters are opaque to the bridge; only the codec engine interprets
/// them. Transmitter and receiver must use the same profile to interoperate.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    name: String,
    params: Value,
}

impl Profile {
    pub fn new(name: impl Into<String>, params: Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Look up a single top-level parameter.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// The parameters re-serialized as compact JSON.
    pub fn params_json(&self) -> String {
        self.params.to_string()
    }
}

/// Immutable set of profiles parsed from a profile document.
///
/// The document is a JSON object mapping profile name to a parameter object:
/// ```json
/// { "audible": { "mod_scheme": "gmsk", "frame_length": 25 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileSet {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileSet {
    pub fn parse(document: &str) -> Result<Self, ModemError> {
        let raw: BTreeMap<String, Value> = serde_json::from_str(document)
            .map_err(|e| ModemError::ProfileParse(e.to_string()))?;

        let mut profiles = BTreeMap::new();
        for (name, params) in raw {
            if !params.is_object() {
                return Err(ModemError::ProfileParse(format!(
                    "profile {name:?} is not an object"
                )));
            }
            profiles.insert(name.clone(), Profile::new(name, params));
        }
        Ok(Self { profiles })
    }

    pub fn get(&self, name: &str) -> Result<&Profile, ModemError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ModemError::UnknownProfile(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
