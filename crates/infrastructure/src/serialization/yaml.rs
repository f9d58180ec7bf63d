use serde::de::DeserializeOwned;

use super::SerializationError;

/// Deserializes YAML from a string.
///
/// # Errors
///
/// Returns an error if the YAML is invalid or doesn't match the expected type.
pub fn from_yaml<T: DeserializeOwned>(yaml: &str) -> Result<T, SerializationError> {
    Ok(serde_yaml::from_str(yaml)?)
}
