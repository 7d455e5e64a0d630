use flume::{Receiver, RecvError, SendError, Sender};
use tokio::sync::oneshot;

/// A message plus an optional slot for the receiver's reply.
pub(crate) struct Envelope<TIn, TOut> {
    message: TIn,
    reply: Option<oneshot::Sender<TOut>>,
}

pub(crate) fn request_channel<TIn, TOut>() -> (RequestSender<TIn, TOut>, RequestReceiver<TIn, TOut>)
{
    let (tx, rx) = flume::unbounded();
    (RequestSender { tx }, RequestReceiver { rx, reply: None })
}

#[derive(Debug)]
pub(crate) struct RequestSender<TIn, TOut> {
    tx: Sender<Envelope<TIn, TOut>>,
}

// Derive would require TIn: Clone and TOut: Clone
impl<TIn, TOut> Clone for RequestSender<TIn, TOut> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct RequestReceiver<TIn, TOut> {
    rx: Receiver<Envelope<TIn, TOut>>,
    reply: Option<oneshot::Sender<TOut>>,
}

impl<TIn, TOut> std::fmt::Debug for Envelope<TIn, TOut>
where
    TIn: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("message", &self.message)
            .field("expects_reply", &self.reply.is_some())
            .finish()
    }
}

impl<TIn, TOut> RequestSender<TIn, TOut> {
    pub(crate) fn send(&self, message: TIn) -> Result<(), SendError<Envelope<TIn, TOut>>> {
        self.tx.send(Envelope {
            message,
            reply: None,
        })
    }

    pub(crate) async fn send_async(
        &self,
        message: TIn,
    ) -> Result<(), SendError<Envelope<TIn, TOut>>> {
        self.tx
            .send_async(Envelope {
                message,
                reply: None,
            })
            .await
    }

    pub(crate) async fn request(&self, message: TIn) -> Result<TOut, String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send_async(Envelope {
                message,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| "Receiver dropped before the request was sent".to_owned())?;
        reply_rx
            .await
            .map_err(|e| format!("Error receiving response: {e:?}"))
    }

    pub(crate) fn is_disconnected(&self) -> bool {
        self.tx.is_disconnected()
    }
}

impl<TIn, TOut> RequestReceiver<TIn, TOut> {
    pub(crate) async fn recv_async(&mut self) -> Result<TIn, RecvError> {
        let envelope = self.rx.recv_async().await?;
        self.reply = envelope.reply;
        Ok(envelope.message)
    }

    /// Answers the most recently received message. Messages sent without a
    /// reply slot are answered with a no-op.
    pub(crate) fn respond(&mut self, response: TOut) -> Result<(), TOut> {
        match self.reply.take() {
            Some(reply) => reply.send(response),
            None => Ok(()),
        }
    }
}
