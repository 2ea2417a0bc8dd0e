use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// A record lacks its bucket key or category value. `index` is the
    /// record's position in the input slice.
    #[error("Malformed record at index {index}: missing or blank `{field}`")]
    MalformedRecord { index: usize, field: String },

    /// A category label equal to the key the quarter is serialized under.
    #[error("Malformed record at index {index}: category `{category}` collides with the quarter key")]
    ReservedCategory { index: usize, category: String },

    /// A sum or share left the range of `Decimal`.
    #[error("ACV total out of range: {0}")]
    Overflow(String),
}
