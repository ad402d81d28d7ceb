#![forbid(unsafe_code)]

pub mod animation;
pub mod config;
pub mod feed;
pub mod foundation;
pub mod layout;
pub mod photo;
pub mod repository;
pub mod session;
pub mod view;

pub use animation::ease::Ease;
pub use config::ShowcaseConfig;
pub use feed::{Arrival, IngestBatch, IngestTracker, MetadataFeed};
pub use foundation::core::{Point, Position3D, Rect, SceneBounds};
pub use foundation::error::{ShowcaseError, ShowcaseResult};
pub use layout::circle_packing::CirclePackingLayout;
pub use layout::embedding::{EmbeddingLayout, EmbeddingSource};
pub use layout::grid::GridLayout;
pub use layout::region::RegionLayout;
pub use layout::side::SideLayout;
pub use layout::{DragOutcome, LayoutPosition, LayoutStrategy};
pub use photo::data::{AnimationState, PhotoData};
pub use photo::metadata::PhotoMetadata;
pub use repository::render::{HeadlessAdapter, RenderAdapter};
pub use repository::{PhotoDataRepository, RepositoryEvent};
pub use session::{SessionCommand, SessionHandle, ShowcaseSession};
