use uuid::Uuid;

/// Produces candidate item codes.
///
/// Swappable so tests can drive the resolver with a predictable sequence.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 codes, hyphenated.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidCodeGenerator;

impl CodeGenerator for UuidCodeGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
