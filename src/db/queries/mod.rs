pub mod ledger;
pub mod obligations;
pub mod sales;

/// Error for a stored value the typed schema does not admit; surfaces
/// bad rows at the store boundary instead of letting them leak upward.
pub(crate) fn invalid_text(index: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        format!("unrecognized value: {}", value).into(),
    )
}
