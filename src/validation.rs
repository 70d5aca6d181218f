use std::fmt;

#[derive(Debug)]
pub enum ValidationError {
    WrongExtension {
        name: &'static str,
        provided: String,
        expected: Vec<&'static str>,
        path: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::WrongExtension {
                name,
                provided,
                expected,
                path,
            } => write!(
                f,
                "Wrong file extension at '{name}', provided {provided}, expected any of [{}] (full path: {path})",
                expected.join(", ")
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Extracts the extension of the last path segment, or an empty string
/// when there is none.
pub fn extract_file_extension(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => "",
    }
}

/// Checks a resource path against the allowed extensions. An empty set
/// accepts anything.
pub fn validate_file_path(
    path: &str,
    extensions: &[&'static str],
    name: &'static str,
) -> Result<(), ValidationError> {
    if extensions.is_empty() {
        return Ok(());
    }
    let provided = extract_file_extension(path);
    if extensions.contains(&provided) {
        Ok(())
    } else {
        Err(ValidationError::WrongExtension {
            name,
            provided: provided.to_string(),
            expected: extensions.to_vec(),
            path: path.to_string(),
        })
    }
}

/// Positive-dimension check with default fallback, used for settings
/// values coming from untyped sources.
pub fn dimension_or_default(value: Option<u32>, default: u32, name: &str) -> u32 {
    match value {
        Some(v) if v > 0 => v,
        Some(v) => {
            log::warn!("Invalid {name} {v}, falling back to {default}.");
            default
        }
        None => default,
    }
}

/// Non-empty-path check with default fallback.
pub fn path_or_default(value: Option<String>, default: &str, name: &str) -> String {
    match value {
        Some(p) if !p.trim().is_empty() => p,
        Some(_) => {
            log::warn!("Invalid {name}, falling back to '{default}'.");
            default.to_string()
        }
        None => default.to_string(),
    }
}
