pub mod spreadsheet;
pub mod target;
pub mod traits;

// Re-export
pub use spreadsheet::SpreadsheetLoader;
pub use target::FileTargetRepository;
pub use traits::{DatasetLoader, TargetRepository};
