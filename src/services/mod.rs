pub mod code_generator;
pub mod code_resolver;
pub mod items_service;

pub use code_generator::{CodeGenerator, UuidCodeGenerator};
pub use code_resolver::CodeResolver;
pub use items_service::ItemsService;
