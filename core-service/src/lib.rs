//! Core service façade.
//!
//! Wires host-provided bridges (HTTP transport, confirmation prompt), the
//! credential provider and the event bus into a [`ResequenceController`].
//! Desktop hosts typically enable the `desktop-shims` feature, which injects
//! the reqwest transport from `bridge-desktop` when none is configured.
//!
//! ```ignore
//! use core_service::{ResequenceController, SortStrategy};
//!
//! let controller = ResequenceController::new(config, credentials, EventBus::new(100));
//! controller.refresh_identity().await?;
//! controller.load(handle).await?;
//! controller.sort(SortStrategy::Smart).await?;
//! let created = controller.commit_as_new().await?;
//! ```

pub mod controller;
pub mod error;
pub mod session;

pub use controller::{CommitOutcome, ResequenceController};
pub use error::{CoreError, Result};
pub use session::PlaylistSession;

pub use core_library::models::{PlaylistHandle, Row, SortDirection, SortField};
pub use core_library::sort::{SortState, SortStrategy};
