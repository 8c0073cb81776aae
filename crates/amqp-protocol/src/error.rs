use amqp_codec::AmqpError;
use thiserror::Error;

/// Failure of [`dispatch_bytes`](crate::dispatch_bytes): either the frame body
/// did not decode, or the handler it was routed to failed.
#[derive(Debug, Error)]
pub enum DispatchError<E> {
    #[error("failed to decode command: {0}")]
    Decode(#[from] AmqpError),
    #[error("command handler failed: {0}")]
    Handler(E),
}

impl<E> DispatchError<E> {
    /// The handler's own error, if the handler was reached.
    pub fn into_handler_error(self) -> Option<E> {
        match self {
            DispatchError::Handler(err) => Some(err),
            DispatchError::Decode(_) => None,
        }
    }
}
