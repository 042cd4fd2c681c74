mod lists;
mod state;

pub use lists::{
    Category, CategoryDraft, FeedList, ListError, ListLibrary, ListTemplate, DEFAULT_FEEDS,
    STANDARD_DEFAULT_LIST,
};
pub use state::{PersistedState, StateError, StateStore, STATE_FILE_NAME};
