//! Filter and pagination composition for paginated admin lists.
//!
//! - [`filter`]: search text, facets and date constraint, mapped to query parameters
//! - [`pagination`]: page requests and the derived pagination state
//! - [`response`]: recognition of bare-array and envelope payloads
//! - [`capability`]: which facets the operator may select
//! - [`debounce`]: trailing debounce for search text
//! - [`list_composer`]: the stateful composer tying them together

pub mod capability;
pub mod debounce;
pub mod filter;
pub mod list_composer;
pub mod pagination;
pub mod response;

pub use capability::{CapabilityProvider, StaticCapabilities};
pub use debounce::Debouncer;
pub use filter::{DateConstraint, DateMode, FacetTag, FilterState, RequestParams};
pub use list_composer::{ComposerBuilder, FetchOutcome, ListComposer, ListView};
pub use pagination::{MAX_PAGE_SIZE, PageRequest, PaginationState};
pub use response::{NormalizedPage, PayloadError, PayloadShape, normalize_response};
