// Card Gallery - Core Library
// Sheet text → normalized cards → merged collection → filtered, sorted views

pub mod parser;
pub mod columns;  // Column Resolver - header aliases
pub mod card;     // Record Builder - coercion and defaults
pub mod merge;    // Multi-Source Merger - ids and category flags
pub mod query;    // Query Engine - search, toggles, sort
pub mod config;
pub mod gallery;  // Concurrent source loading

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use parser::{parse_rows, split_header, Row};
pub use columns::{ColumnMap, Field, FieldAliases, FIELD_TABLE};
pub use card::{
    Card, Category, Edition, Grade, Population,
    parse_sheet, PLACEHOLDER_IMAGE,
};
pub use merge::{card_id, merge_sources, slugify};
pub use query::{
    apply, category_counts, find_by_id,
    CategorySelection, QueryOptions, SortKey,
};
pub use config::{GalleryConfig, ServerConfig, SheetLocation, SheetSource};
pub use gallery::{
    ingest, load_gallery,
    DefaultFetcher, Gallery, GalleryStatus, SheetFetcher, SourceFailure,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
