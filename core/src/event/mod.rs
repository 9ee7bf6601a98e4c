// Event module: signed payload types and relay wire encoding

pub mod types;
pub mod codec;

pub use types::{EventDraft, Kind, SignedEvent, Tag};
pub use codec::{decode_event, encode_publish_frame, event_id, EventError, MAX_FRAME_SIZE};

pub(crate) use types::unix_now;
