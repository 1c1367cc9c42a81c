/// Source of opaque identifiers for new quotes and likes.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}
