//! Tola Wiki - resolve human page names to files in versioned git trees.
//!
//! A page called `Bilbo Baggins` may live anywhere in the repository as
//! `Bilbo-Baggins.md`, `people/Bilbo-Baggins.org` and so on. [`Wiki`]
//! resolves such names at any commit by searching the tree breadth-first,
//! so the shallowest match wins.
//!
//! # Module Structure
//!
//! ```text
//! src/
//! ├── config/    # WikiConfig (wiki.toml)
//! ├── page/      # PageHandle, Format, name rules
//! ├── render/    # Renderer trait, Markdown via pulldown-cmark
//! ├── store/     # VersionStore trait, GitStore, MemoryStore
//! ├── error.rs   # WikiError
//! ├── logger.rs  # log!/debug! macros
//! ├── resolve.rs # breadth-first Resolver
//! └── wiki.rs    # Wiki facade
//! ```

pub mod logger;

pub mod config;
pub mod error;
pub mod page;
pub mod render;
pub mod resolve;
pub mod store;
pub mod wiki;

pub use config::WikiConfig;
pub use error::WikiError;
pub use page::{Format, PageHandle, canonicalize};
pub use render::{MarkupRenderer, RenderError, Renderer};
pub use resolve::Resolver;
pub use store::{GitStore, MemoryStore, Pagination, StoreError, VersionStore};
pub use wiki::Wiki;
