use uuid::Uuid;

/// Source of fresh storage keys for `Cache::store`.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random v4 UUIDs in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeys;

impl KeyGenerator for UuidKeys {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
