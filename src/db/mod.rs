pub mod inventory;
pub mod memory;
pub mod pool;
pub mod repository;

pub use inventory::PgItemRepository;
pub use memory::MemoryItemRepository;
pub use pool::create_pool;
pub use repository::ItemRepository;
