//! Wire payloads shared by the REST calls and the event streams.
//!
//! Field names are camelCase on the wire. Absent fields fall back to their
//! defaults so partial payloads still decode.

mod cursor;
mod facts;
mod matches;
mod speech;
mod wallet;

pub use cursor::FeedCursor;
pub(crate) use cursor::format_since;
pub use facts::{FactItem, FactsWindow, PatchReviewStatusResponse, ReviewStatusRequest};
pub use matches::{MatchFilters, MatchItem, MatchesSnapshot, MatchesUpdate, MatchingDirection};
pub use speech::{
    SpeechAudioUpload, SpeechStatusResponse, SpeechTextUpload, SpeechUploadResponse,
    DEFAULT_AUDIO_FILE_NAME,
};
pub use wallet::{CreateProWalletResponse, VerifyProWalletResponse};
