pub mod author;
pub mod event;
pub mod traffic;
pub mod window;

pub use author::{is_agency_account, Author, AuthorIndex, AGENCY_ACCOUNT, AGENCY_DISPLAY_NAME};
pub use event::{ActionType, EditorialEvent, NoteId};
pub use traffic::{SessionRecord, TrafficRecord};
pub use window::DateWindow;
