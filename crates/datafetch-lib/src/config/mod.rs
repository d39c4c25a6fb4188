mod loader;
mod model;

pub use loader::{ConfigOverrides, DEFAULT_CONFIG, load_config};
pub use model::{Config, DEFAULT_CHUNK_SIZE, DEFAULT_DATA_DIR};
