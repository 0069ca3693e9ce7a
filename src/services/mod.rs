//! Service layer for the jobscout application.
//!
//! This module contains the business logic for:
//! - Upstream listing acquisition (`ApifyListingSource`)
//! - Career page discovery (`CareerPageFinder`)
//! - AI-assisted fallback lookup (`AiFallback`)
//! - Browser rendering (`ChromiumRenderer`)
//! - Position extraction (`PositionExtractor`)

mod ai;
mod browser;
mod discovery;
mod listings;
mod positions;

pub use ai::AiFallback;
pub use browser::{ChromiumRenderer, RenderEngine};
pub use discovery::CareerPageFinder;
pub use listings::{ApifyListingSource, ListingSource, extract_companies};
pub use positions::PositionExtractor;
