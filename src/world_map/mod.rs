//! Infinite tile grid streamed around any number of views.

pub mod components;
pub mod decorator;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod plugin;
pub mod pool;
pub mod rect;
pub mod systems;
pub mod tile;
pub mod views;

pub use components::{GroundProjectedView, MapView, StreamingStats, TilePalette, WorldMapTile};
pub use decorator::{appearance_bucket, DecorationSlot, HeadlessRenderer, TileDecorator, TileRenderer};
pub use engine::{FrameReport, TileStreamer};
pub use error::{GridError, RectIssue};
pub use extractor::ViewExtractor;
pub use plugin::{WorldMapPlugin, WorldMapSet};
pub use pool::{PoolPolicy, TilePool};
pub use rect::{TileCoord, ViewRect, MAX_VIEW_EXTENT};
pub use systems::{view_id, EntityTileRenderer};
pub use tile::{RenderHandle, Tile, TileId, TileSnapshot};
pub use views::{ViewId, ViewState};
