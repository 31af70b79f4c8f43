//! Service layer for toloka-node
//!
//! ```text
//! HTTP Handlers (thin)
//!     ↓
//! Service Layer (policy + transaction boundaries)
//!     ↓
//! Repository Layer (db/*.rs)
//!     ↓
//! SQLite Database
//! ```

pub mod community_service;
pub mod completion_service;
pub mod participation_service;

pub use community_service::CommunityService;
pub use completion_service::{CompletionRequest, CompletionService, EventCompletion};
pub use participation_service::{CreateEventRequest, MembershipRequest, ParticipationService};
