pub mod config;
pub mod gesture;
pub mod input;
pub mod popup;
pub mod primitives;
pub mod selection;
pub mod shortcuts;
pub mod store;
pub mod sync;
pub mod text_edit;
pub mod upload;

pub use config::{ConfigError, EditorConfig};
pub use input::{InputEvent, Modifiers};
pub use popup::{PopupPolicy, PopupScope, PopupState};
pub use sync::{CanvasSession, Effect, Effects};
pub use upload::{UploadError, UploadTicket};
