//! Accounting of banked memory regions. Areas reported by a linker or a
//! compiler are assigned to instances of the regions they fall into (banks),
//! and then usage is computed, summarized and rendered out of them.

pub mod area;
pub mod engine;
pub mod options;
pub mod render;
pub mod summary;
pub mod template;
pub mod usage;
mod warning;

pub use area::Area;
pub use engine::{Bank, Banks};
pub use options::{AreaSort, InputSource, Options};
pub use template::{MemKind, Template, TEMPLATES};
pub use warning::Warning;
