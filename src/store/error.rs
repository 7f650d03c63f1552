/// Store failures that callers need to tell apart from plain I/O errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no document '{id}' in collection '{collection}'")]
    NotFound { collection: String, id: String },
    #[error("invalid document: {0}")]
    Invalid(String),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}
