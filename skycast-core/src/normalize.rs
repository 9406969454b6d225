use crate::error::QueryError;

/// Clean a raw, user-supplied city query.
///
/// Trims the input, strips everything outside word characters / whitespace /
/// comma / hyphen, collapses internal whitespace runs, and keeps only the
/// locality token before the first comma ("New York, NY" searches "New York").
///
/// Pure and deterministic; never touches the network.
pub fn clean_city_query(raw: &str) -> Result<String, QueryError> {
    if raw.trim().is_empty() {
        return Err(QueryError::InvalidInput(
            "Please enter a city name".to_string(),
        ));
    }

    let stripped: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | ',' | '-'))
        .collect();

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    let locality = collapsed
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    if locality.is_empty() {
        return Err(QueryError::InvalidInput(
            "Please enter a city name".to_string(),
        ));
    }

    Ok(locality)
}
