//! Typed AMQP 1.0 structures and command dispatch.
//!
//! Structures are declared as schema tables (see [`structure`]): each table
//! yields a type with named, typed accessors over a lazily decoded described
//! list or map. Performatives additionally route to a [`CommandHandler`].
//!
//! # Example
//!
//! ```
//! use amqp_codec::Encode;
//! use amqp_protocol::{dispatch_bytes, Close, CommandHandler, Open};
//! # use amqp_protocol::*;
//!
//! #[derive(Default)]
//! struct Connection {
//!     container: Option<String>,
//! }
//!
//! impl CommandHandler for Connection {
//!     type Error = String;
//!
//!     fn handle_open(&mut self, open: Open) -> Result<(), String> {
//!         self.container = open.container_id().map_err(|e| e.to_string())?;
//!         Ok(())
//!     }
//!     # fn handle_begin(&mut self, _: Begin) -> Result<(), String> { Ok(()) }
//!     # fn handle_attach(&mut self, _: Attach) -> Result<(), String> { Ok(()) }
//!     # fn handle_flow(&mut self, _: Flow) -> Result<(), String> { Ok(()) }
//!     # fn handle_transfer(&mut self, _: Transfer) -> Result<(), String> { Ok(()) }
//!     # fn handle_disposition(&mut self, _: Disposition) -> Result<(), String> { Ok(()) }
//!     # fn handle_detach(&mut self, _: Detach) -> Result<(), String> { Ok(()) }
//!     # fn handle_end(&mut self, _: End) -> Result<(), String> { Ok(()) }
//!     fn handle_close(&mut self, _: Close) -> Result<(), String> {
//!         Err("unexpected close".to_owned())
//!     }
//!     # fn handle_txn(&mut self, _: Txn) -> Result<(), String> { Ok(()) }
//! }
//!
//! let mut open = Open::new();
//! open.set_container_id("broker".to_owned());
//! let bytes = open.to_bytes().unwrap();
//!
//! let mut connection = Connection::default();
//! dispatch_bytes(&bytes, 0, &mut connection).unwrap();
//! assert_eq!(connection.container.as_deref(), Some("broker"));
//! ```

mod definitions;
mod dispatch;
mod error;
mod message;
mod outcome;
mod performative;
mod schema;

pub mod structure;

pub use definitions::{condition, ErrorInfo, ErrorInfoField, ErrorInfoSchema};
pub use dispatch::{dispatch_bytes, Command, CommandHandler, CommandKind};
pub use error::DispatchError;
pub use message::{Header, HeaderField, HeaderSchema};
pub use outcome::{Released, ReleasedSchema};
pub use performative::{
    Attach, AttachField, AttachSchema, Begin, BeginField, BeginSchema, Close, CloseField,
    CloseSchema, Detach, DetachField, DetachSchema, Disposition, DispositionField,
    DispositionSchema, End, EndField, EndSchema, Flow, FlowField, FlowSchema, Open, OpenField,
    OpenSchema, Transfer, TransferField, TransferSchema, Txn, TxnField, TxnSchema, RECEIVER,
    SENDER,
};
pub use structure::{DescribedList, DescribedMap, FieldSpec, ListSchema, MapSchema};
