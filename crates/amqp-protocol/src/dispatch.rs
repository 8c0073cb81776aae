//! Routing decoded performatives to a handler.

use amqp_buffers::Writer;
use amqp_codec::{AmqpError, Bytes, Decode, Descriptor, Encode, Encoded, Result};
use tracing::{debug, trace};

use crate::error::DispatchError;
use crate::performative::{
    Attach, AttachSchema, Begin, BeginSchema, Close, CloseSchema, Detach, DetachSchema,
    Disposition, DispositionSchema, End, EndSchema, Flow, FlowSchema, Open, OpenSchema, Transfer,
    TransferSchema, Txn, TxnSchema,
};
use crate::structure::ListSchema;

/// One operation per performative.
///
/// Handlers receive the decoded command by value. Whatever a handler returns
/// is passed back to the caller of `dispatch` untouched.
pub trait CommandHandler {
    type Error;

    fn handle_open(&mut self, open: Open) -> std::result::Result<(), Self::Error>;

    fn handle_begin(&mut self, begin: Begin) -> std::result::Result<(), Self::Error>;

    fn handle_attach(&mut self, attach: Attach) -> std::result::Result<(), Self::Error>;

    fn handle_flow(&mut self, flow: Flow) -> std::result::Result<(), Self::Error>;

    fn handle_transfer(&mut self, transfer: Transfer) -> std::result::Result<(), Self::Error>;

    fn handle_disposition(
        &mut self,
        disposition: Disposition,
    ) -> std::result::Result<(), Self::Error>;

    fn handle_detach(&mut self, detach: Detach) -> std::result::Result<(), Self::Error>;

    fn handle_end(&mut self, end: End) -> std::result::Result<(), Self::Error>;

    fn handle_close(&mut self, close: Close) -> std::result::Result<(), Self::Error>;

    fn handle_txn(&mut self, txn: Txn) -> std::result::Result<(), Self::Error>;
}

macro_rules! commands {
    ($($variant:ident($schema:ident) => $handle:ident;)+) => {
        /// The kind of a [`Command`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum CommandKind {
            $($variant,)+
        }

        impl CommandKind {
            pub const ALL: &'static [CommandKind] = &[$(CommandKind::$variant,)+];

            pub const fn name(self) -> &'static str {
                match self {
                    $(CommandKind::$variant => <$schema as ListSchema>::NAME,)+
                }
            }

            pub const fn symbol(self) -> &'static str {
                match self {
                    $(CommandKind::$variant => <$schema as ListSchema>::SYMBOL,)+
                }
            }

            pub const fn code(self) -> u64 {
                match self {
                    $(CommandKind::$variant => <$schema as ListSchema>::CODE,)+
                }
            }

            /// The kind named by either form of `descriptor`.
            pub fn from_descriptor(descriptor: &Descriptor) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|kind| descriptor.matches(kind.symbol(), kind.code()))
            }
        }

        /// Any performative.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Command {
            $($variant($variant),)+
        }

        impl Command {
            pub fn kind(&self) -> CommandKind {
                match self {
                    $(Command::$variant(_) => CommandKind::$variant,)+
                }
            }

            /// The numeric descriptor this command is written with.
            pub fn descriptor(&self) -> Descriptor {
                Descriptor::Code(self.kind().code())
            }

            /// Calls the one handler operation for this command's kind.
            pub fn dispatch<H: CommandHandler + ?Sized>(
                self,
                handler: &mut H,
            ) -> std::result::Result<(), H::Error> {
                match self {
                    $(Command::$variant(command) => command.dispatch(handler),)+
                }
            }
        }

        $(
            impl From<$variant> for Command {
                fn from(command: $variant) -> Self {
                    Command::$variant(command)
                }
            }

            impl $variant {
                /// Calls the handler operation for this performative.
                pub fn dispatch<H: CommandHandler + ?Sized>(
                    self,
                    handler: &mut H,
                ) -> std::result::Result<(), H::Error> {
                    debug!(command = CommandKind::$variant.name(), "dispatching command");
                    handler.$handle(self)
                }
            }
        )+

        impl Encode for Command {
            fn format_code(&self) -> u8 {
                match self {
                    $(Command::$variant(command) => command.format_code(),)+
                }
            }

            fn encoded_size(&self) -> Result<u32> {
                match self {
                    $(Command::$variant(command) => command.encoded_size(),)+
                }
            }

            fn write(&self, writer: &mut Writer) -> Result<()> {
                match self {
                    $(Command::$variant(command) => command.write(writer),)+
                }
            }

            fn to_bytes(&self) -> Result<Bytes> {
                match self {
                    $(Command::$variant(command) => command.to_bytes(),)+
                }
            }
        }

        impl Decode for Command {
            /// Routes on the descriptor, then decodes the matching
            /// performative.
            fn decode(encoded: &Encoded) -> Result<Self> {
                let (descriptor, _) = encoded.described_parts()?;
                let descriptor = Descriptor::decode(&descriptor)?;
                let kind = CommandKind::from_descriptor(&descriptor).ok_or_else(|| {
                    AmqpError::InvalidDescriptor {
                        expected: "performative",
                        found: descriptor.to_string(),
                    }
                })?;
                trace!(command = kind.name(), len = encoded.len(), "decoding command");
                match kind {
                    $(CommandKind::$variant => $variant::decode(encoded).map(Command::$variant),)+
                }
            }
        }
    };
}

commands! {
    Open(OpenSchema) => handle_open;
    Begin(BeginSchema) => handle_begin;
    Attach(AttachSchema) => handle_attach;
    Flow(FlowSchema) => handle_flow;
    Transfer(TransferSchema) => handle_transfer;
    Disposition(DispositionSchema) => handle_disposition;
    Detach(DetachSchema) => handle_detach;
    End(EndSchema) => handle_end;
    Close(CloseSchema) => handle_close;
    Txn(TxnSchema) => handle_txn;
}

/// Decodes the command at `offset` and dispatches it to `handler`.
pub fn dispatch_bytes<H: CommandHandler + ?Sized>(
    bytes: &Bytes,
    offset: usize,
    handler: &mut H,
) -> std::result::Result<(), DispatchError<H::Error>> {
    let command = Command::decode_from(bytes, offset)?;
    command.dispatch(handler).map_err(DispatchError::Handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_resolve_from_either_descriptor() {
        for kind in CommandKind::ALL {
            let by_code = Descriptor::Code(kind.code());
            let by_symbol = Descriptor::Symbol(amqp_codec::Symbol::from_static(kind.symbol()));
            assert_eq!(CommandKind::from_descriptor(&by_code), Some(*kind));
            assert_eq!(CommandKind::from_descriptor(&by_symbol), Some(*kind));
        }
        assert_eq!(CommandKind::from_descriptor(&Descriptor::Code(0x1d)), None);
    }

    #[test]
    fn unknown_descriptor_is_rejected() {
        let bytes = crate::ErrorInfo::with_condition(amqp_codec::Symbol::from_static("amqp:not-found"))
            .to_bytes()
            .unwrap();
        let err = Command::decode_from(&bytes, 0).unwrap_err();
        assert!(matches!(
            err,
            AmqpError::InvalidDescriptor {
                expected: "performative",
                ..
            }
        ));
    }
}
