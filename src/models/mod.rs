pub mod progress;
pub mod title;

pub use progress::ProgressEntry;
pub use title::{Name, NewTitle, Title, TitleChanges};
