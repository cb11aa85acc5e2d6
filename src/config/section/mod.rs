//! Configuration section definitions for `wiki.toml`.

mod page;
mod render;
mod repo;

pub use page::PageConfig;
pub use render::RenderConfig;
pub use repo::RepoConfig;
