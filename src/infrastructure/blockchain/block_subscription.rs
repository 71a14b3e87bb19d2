//! New-block triggers from a websocket `newHeads` subscription

use async_trait::async_trait;
use ethers::providers::{Middleware, Provider, Ws};
use ethers::types::{Block, TxHash};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::application::{TriggerSource, TriggerStream};
use crate::shared::errors::StreamError;
use crate::shared::types::Trigger;

/// Opens a dedicated websocket connection per subscription, so a dropped
/// transport is replaced by a fresh one on the next `subscribe`.
#[derive(Debug, Clone)]
pub struct NewHeadsSource {
    url: String,
    buffer: usize,
}

impl NewHeadsSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            buffer: 64,
        }
    }
}

/// Pending headers carry no number; they cannot identify a trigger.
pub fn trigger_from_block(block: &Block<TxHash>) -> Option<Trigger> {
    block.number.map(|number| Trigger::new(number.as_u64()))
}

#[async_trait]
impl TriggerSource for NewHeadsSource {
    async fn subscribe(&self) -> Result<TriggerStream, StreamError> {
        let provider = Provider::<Ws>::connect(self.url.as_str())
            .await
            .map_err(|e| StreamError::Transport(format!("connect {}: {}", self.url, e)))?;

        let (tx, rx) = mpsc::channel(self.buffer);
        tokio::spawn(async move {
            let mut blocks = match provider.subscribe_blocks().await {
                Ok(blocks) => blocks,
                Err(e) => {
                    let _ = tx.send(Err(StreamError::Transport(format!("eth_subscribe: {}", e)))).await;
                    return;
                }
            };
            info!("📡 newHeads subscription active");

            while let Some(block) = blocks.next().await {
                let Some(trigger) = trigger_from_block(&block) else {
                    debug!("Skipping header without a block number");
                    continue;
                };
                if tx.send(Ok(trigger)).await.is_err() {
                    // subscriber went away
                    return;
                }
            }

            let _ = tx
                .send(Err(StreamError::Transport("newHeads subscription closed".to_string())))
                .await;
        });

        Ok(ReceiverStream::new(rx).boxed())
    }
}
