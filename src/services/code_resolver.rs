use std::sync::Arc;

use crate::db::ItemRepository;
use crate::error::{AppError, AppResult};
use crate::models::validate_code;
use crate::services::code_generator::CodeGenerator;

/// Turns an optional client-supplied code into one that is not in the store
/// at the moment of the check.
///
/// The check is advisory: the unique constraint on the table is what actually
/// guarantees uniqueness, and callers retry when an insert still collides.
#[derive(Clone)]
pub struct CodeResolver {
    repository: Arc<dyn ItemRepository>,
    generator: Arc<dyn CodeGenerator>,
    max_attempts: u32,
}

impl CodeResolver {
    pub fn new(
        repository: Arc<dyn ItemRepository>,
        generator: Arc<dyn CodeGenerator>,
        max_attempts: u32,
    ) -> Self {
        Self {
            repository,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub async fn resolve(&self, requested: Option<&str>) -> AppResult<String> {
        if let Some(code) = requested.filter(|c| !c.trim().is_empty()) {
            validate_code(code)?;
            if !self.repository.exists_by_code(code).await? {
                return Ok(code.to_string());
            }
            tracing::info!("Requested code already in use, generating a new one: code={}", code);
        }

        self.generate_unique().await
    }

    async fn generate_unique(&self) -> AppResult<String> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generator.generate();
            if !self.repository.exists_by_code(&candidate).await? {
                return Ok(candidate);
            }
            tracing::warn!(
                "Generated code collided: attempt={}/{}, code={}",
                attempt,
                self.max_attempts,
                candidate
            );
        }

        Err(AppError::ResolutionExhausted {
            attempts: self.max_attempts,
        })
    }
}
