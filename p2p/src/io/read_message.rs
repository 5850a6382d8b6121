use crate::io::{read_any_message, Error, SharedTcpStream};
use message::{deserialize_payload, Error as MessageError, Payload};
use network::Magic;

pub async fn read_message<M>(a: &SharedTcpStream, magic: Magic, version: u32) -> Result<M, Error>
where
	M: Payload,
{
	let (command, payload) = read_any_message(a, magic).await?;

	if command != M::command() {
		return Err(MessageError::InvalidCommand.into());
	}

	deserialize_payload(&payload, version).map_err(Into::into)
}

#[cfg(test)]
mod tests {
	use super::read_message;
	use crate::io::shared_tcp_stream::SharedTcpStream;
	use message::types::{HaveTx, LosingTx};
	use message::{serialize_payload, to_raw_message};
	use network::Network;

	fn raw(payload: &HaveTx) -> crate::bytes::Bytes {
		let serialized = serialize_payload(payload, 0).unwrap();
		to_raw_message(Network::Mainnet.magic(), "have_tx".into(), &serialized)
	}

	#[tokio::test]
	async fn test_read_message_typed() {
		let expected = HaveTx {
			tx_hashes: vec![bitcrypto::dhash256(b"tx")],
		};
		let stream = SharedTcpStream::new(raw(&expected));

		assert_eq!(read_message::<HaveTx>(&stream, Network::Mainnet.magic(), 0).await.unwrap(), expected);
	}

	#[tokio::test]
	async fn test_read_message_wrong_command() {
		let stream = SharedTcpStream::new(raw(&HaveTx { tx_hashes: vec![] }));

		assert!(read_message::<LosingTx>(&stream, Network::Mainnet.magic(), 0).await.is_err());
	}
}
