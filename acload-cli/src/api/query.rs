//! OData filter construction for collection queries

/// `?$filter=internalId+eq+'<value>'` for the given local id.
///
/// Single quotes in the value are doubled per OData string literal rules and
/// the literal is percent-encoded; spaces between tokens stay as `+`.
pub fn internal_id_filter(internal_id: &str) -> String {
    field_eq_filter("internalId", internal_id)
}

pub fn field_eq_filter(field: &str, value: &str) -> String {
    let literal = value.replace('\'', "''");
    format!(
        "?$filter={}+eq+'{}'",
        field,
        urlencoding::encode(&literal)
    )
}

/// Collection path with a local id filter applied
pub fn filtered_path(path: &str, internal_id: &str) -> String {
    format!("{}{}", path, internal_id_filter(internal_id))
}
