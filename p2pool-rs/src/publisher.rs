//! Task publisher transport: serialized task messages fan out to every
//! connected subscriber as JSON lines.

use miner::{TaskMessage, TaskPublisher};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

pub struct TaskSink {
	subscribers: Mutex<Vec<UnboundedSender<String>>>,
	/// Fires when the sink transitions from empty to deliverable.
	ready_events: UnboundedSender<()>,
}

impl TaskSink {
	pub fn new(ready_events: UnboundedSender<()>) -> TaskSink {
		TaskSink {
			subscribers: Mutex::new(Vec::new()),
			ready_events,
		}
	}

	pub async fn listen(self: Arc<Self>, address: SocketAddr) {
		let listener = match TcpListener::bind(&address).await {
			Ok(listener) => listener,
			Err(err) => {
				error!("unable to bind task publisher to {}: {}", address, err);
				return;
			}
		};

		info!("publishing tasks on {}", address);
		loop {
			match listener.accept().await {
				Ok((mut stream, peer)) => {
					info!("task subscriber connected from {}", peer);

					let (sender, mut receiver) = unbounded_channel::<String>();
					let became_ready = {
						let mut subscribers = self.subscribers.lock();
						subscribers.push(sender);
						subscribers.len() == 1
					};
					if became_ready {
						let _ = self.ready_events.send(());
					}

					tokio::spawn(async move {
						while let Some(line) = receiver.recv().await {
							if stream.write_all(format!("{}\n", line).as_bytes()).await.is_err() {
								break;
							}
						}
					});
				}
				Err(_) => { /* connection failed */ }
			}
		}
	}
}

impl TaskPublisher for TaskSink {
	fn is_ready(&self) -> bool {
		!self.subscribers.lock().is_empty()
	}

	fn publish(&self, task: &TaskMessage) {
		let line = match serde_json::to_string(task) {
			Ok(line) => line,
			Err(err) => {
				warn!("failed to serialize task {}: {}", task.task_id, err);
				return;
			}
		};

		// drop subscribers whose writer is gone
		let mut subscribers = self.subscribers.lock();
		subscribers.retain(|subscriber| subscriber.send(line.clone()).is_ok());
	}
}
