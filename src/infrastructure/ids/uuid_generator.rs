use crate::domain::quote::id_generator::IdGenerator;
use uuid::Uuid;

/// Random (version 4) UUIDs in the canonical 8-4-4-4-12 hex layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
