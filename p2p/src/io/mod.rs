mod error;
mod handshake;
mod read_any_message;
mod read_header;
mod read_message;
pub mod shared_tcp_stream;
mod write_message;

pub use self::error::Error;
pub use self::handshake::{accept_handshake, handshake, HandshakeResult};
pub use self::read_any_message::read_any_message;
pub use self::read_header::read_header;
pub use self::read_message::read_message;
pub use self::shared_tcp_stream::SharedTcpStream;
pub use self::write_message::write_message;
