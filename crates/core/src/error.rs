/// Errors returned by the `mu-core` crate.
///
/// Validation and classification never fail. Only aggregation (on a description mismatch) and
/// the configuration/document boundary return errors.
#[derive(Debug, thiserror::Error)]
pub enum MuError {
    #[error("cannot merge aggregate '{found}' into aggregate '{expected}': descriptions differ")]
    DescriptionMismatch { expected: String, found: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`MuError`].
pub type MuResult<T> = std::result::Result<T, MuError>;

/// Deserialize YAML text into `T`, reporting the failing field path on schema mismatch.
///
/// `what` names the thing being parsed and prefixes the error message.
pub(crate) fn from_yaml_with_path<T>(yaml_text: &str, what: &str) -> MuResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

    match serde_path_to_error::deserialize::<_, T>(deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(MuError::Translation(format!(
                "{what} schema mismatch at {path}: {source}"
            )))
        }
    }
}
