//! Block entity and hierarchy utilities for Tessera.
//!
//! # Design Philosophy
//!
//! Blocks are stored flat: each record names its parent by id, and the tree
//! only exists when someone asks for it. This keeps repositories simple and
//! makes partially-loaded or license-filtered lists safe to work with: a
//! block whose parent is missing is promoted to a root, never rejected.
//!
//! - [`Block`] wraps one record and owns every mutation of it. Reads hand out
//!   copies; writes bump the metadata version.
//! - [`hierarchy`] holds pure functions over `&[BlockRecord]`: forest
//!   construction, descendant and ancestor queries.

mod entity;
pub mod hierarchy;

pub use entity::Block;
pub use hierarchy::{
    block_depth, build_block_hierarchy, flatten_hierarchy, get_all_children,
    get_ancestors, is_child_of,
};

pub use tessera_types::{Attributes, BlockId, BlockMetadata, BlockRecord, BlockRecordBuilder};
