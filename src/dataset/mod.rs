//! Dataset loading and filtering.
//!
//! ```text
//!  bestsellers CSV
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  validate header, parse rows → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter  │  year / genre / price category → FilteredView
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;

pub use filter::{FilterOptions, FilterState, FilteredView};
pub use loader::Dataset;
