//! Page-level SEO metadata for the front-end renderer.
//!
//! - [`metadata`]: title, description, keywords, canonical URL, Open Graph
//!   and Twitter card for a page
//! - [`jsonld`]: schema.org structured data (`NewsArticle`, organization,
//!   website search box, breadcrumbs)

pub mod jsonld;
pub mod metadata;

pub use metadata::{PageContext, PageMetadata, PageType, assemble};
