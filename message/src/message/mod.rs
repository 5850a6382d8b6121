mod message;
mod message_header;

pub use self::message::{to_raw_message, Message};
pub use self::message_header::MessageHeader;
