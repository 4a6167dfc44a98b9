// wire encodes Value trees into self-describing flat binary buffers and
// decodes them back, and frames ordered sets of named values into the
// persisted result-file format.

mod error;
pub use error::DecodeError;

mod codec;
pub use codec::{decode, encode};

mod message;
pub use message::{Message, SCHEMA_VERSION};
