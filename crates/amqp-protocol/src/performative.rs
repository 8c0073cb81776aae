//! Frame bodies of the transport layer.
//!
//! Each performative is a described list; see [`Command`](crate::Command)
//! for decoding and dispatching them without knowing the kind in advance.

use amqp_codec::{AmqpValue, Bytes, Map, Symbol};

use crate::definitions::ErrorInfo;
use crate::schema::described_list;

/// `role` value of a link endpoint that sends messages.
pub const SENDER: bool = false;
/// `role` value of a link endpoint that receives messages.
pub const RECEIVER: bool = true;

described_list! {
    /// Negotiates connection parameters.
    pub struct Open {
        schema: OpenSchema,
        fields: OpenField,
        name: "open",
        descriptor: ("amqp:open:list", 0x10),
    }
    0 ContainerId "container-id" => container_id, set_container_id: String, mandatory;
    1 Hostname "hostname" => hostname, set_hostname: String;
    /// Largest frame the sender will accept, in bytes.
    2 MaxFrameSize "max-frame-size" => max_frame_size, set_max_frame_size: u32;
    3 ChannelMax "channel-max" => channel_max, set_channel_max: u16;
    /// Idle timeout in milliseconds.
    4 IdleTimeOut "idle-time-out" => idle_time_out, set_idle_time_out: u32;
    5 OutgoingLocales "outgoing-locales" => outgoing_locales, set_outgoing_locales: Vec<Symbol>;
    6 IncomingLocales "incoming-locales" => incoming_locales, set_incoming_locales: Vec<Symbol>;
    7 OfferedCapabilities "offered-capabilities" => offered_capabilities, set_offered_capabilities: Vec<Symbol>;
    8 DesiredCapabilities "desired-capabilities" => desired_capabilities, set_desired_capabilities: Vec<Symbol>;
    9 Properties "properties" => properties, set_properties: Map;
}

described_list! {
    /// Begins a session on a channel.
    pub struct Begin {
        schema: BeginSchema,
        fields: BeginField,
        name: "begin",
        descriptor: ("amqp:begin:list", 0x11),
    }
    /// Set when answering a `begin` from the peer.
    0 RemoteChannel "remote-channel" => remote_channel, set_remote_channel: u16;
    1 NextOutgoingId "next-outgoing-id" => next_outgoing_id, set_next_outgoing_id: u32, mandatory;
    2 IncomingWindow "incoming-window" => incoming_window, set_incoming_window: u32, mandatory;
    3 OutgoingWindow "outgoing-window" => outgoing_window, set_outgoing_window: u32, mandatory;
    4 HandleMax "handle-max" => handle_max, set_handle_max: u32;
    5 OfferedCapabilities "offered-capabilities" => offered_capabilities, set_offered_capabilities: Vec<Symbol>;
    6 DesiredCapabilities "desired-capabilities" => desired_capabilities, set_desired_capabilities: Vec<Symbol>;
    7 Properties "properties" => properties, set_properties: Map;
}

described_list! {
    /// Attaches a link to a session.
    pub struct Attach {
        schema: AttachSchema,
        fields: AttachField,
        name: "attach",
        descriptor: ("amqp:attach:list", 0x12),
    }
    0 Name "name" => name, set_name: String, mandatory;
    1 Handle "handle" => handle, set_handle: u32, mandatory;
    /// [`SENDER`] or [`RECEIVER`].
    2 Role "role" => role, set_role: bool, mandatory;
    3 SndSettleMode "snd-settle-mode" => snd_settle_mode, set_snd_settle_mode: u8;
    4 RcvSettleMode "rcv-settle-mode" => rcv_settle_mode, set_rcv_settle_mode: u8;
    5 Source "source" => source, set_source: AmqpValue;
    6 Target "target" => target, set_target: AmqpValue;
    7 Unsettled "unsettled" => unsettled, set_unsettled: Map;
    8 IncompleteUnsettled "incomplete-unsettled" => incomplete_unsettled, set_incomplete_unsettled: bool;
    9 InitialDeliveryCount "initial-delivery-count" => initial_delivery_count, set_initial_delivery_count: u32;
    10 MaxMessageSize "max-message-size" => max_message_size, set_max_message_size: u64;
    11 OfferedCapabilities "offered-capabilities" => offered_capabilities, set_offered_capabilities: Vec<Symbol>;
    12 DesiredCapabilities "desired-capabilities" => desired_capabilities, set_desired_capabilities: Vec<Symbol>;
    13 Properties "properties" => properties, set_properties: Map;
}

described_list! {
    /// Updates link and session flow state.
    pub struct Flow {
        schema: FlowSchema,
        fields: FlowField,
        name: "flow",
        descriptor: ("amqp:flow:list", 0x13),
    }
    0 NextIncomingId "next-incoming-id" => next_incoming_id, set_next_incoming_id: u32;
    1 IncomingWindow "incoming-window" => incoming_window, set_incoming_window: u32, mandatory;
    2 NextOutgoingId "next-outgoing-id" => next_outgoing_id, set_next_outgoing_id: u32, mandatory;
    3 OutgoingWindow "outgoing-window" => outgoing_window, set_outgoing_window: u32, mandatory;
    4 Handle "handle" => handle, set_handle: u32;
    5 DeliveryCount "delivery-count" => delivery_count, set_delivery_count: u32;
    6 LinkCredit "link-credit" => link_credit, set_link_credit: u32;
    7 Available "available" => available, set_available: u32;
    8 Drain "drain" => drain, set_drain: bool;
    9 Echo "echo" => echo, set_echo: bool;
    10 Properties "properties" => properties, set_properties: Map;
}

described_list! {
    /// Carries a message frame over a link.
    pub struct Transfer {
        schema: TransferSchema,
        fields: TransferField,
        name: "transfer",
        descriptor: ("amqp:transfer:list", 0x14),
    }
    0 Handle "handle" => handle, set_handle: u32, mandatory;
    1 DeliveryId "delivery-id" => delivery_id, set_delivery_id: u32;
    2 DeliveryTag "delivery-tag" => delivery_tag, set_delivery_tag: Bytes;
    3 MessageFormat "message-format" => message_format, set_message_format: u32;
    4 Settled "settled" => settled, set_settled: bool;
    /// More frames of the same delivery follow.
    5 More "more" => more, set_more: bool;
    6 RcvSettleMode "rcv-settle-mode" => rcv_settle_mode, set_rcv_settle_mode: u8;
    7 State "state" => state, set_state: AmqpValue;
    8 Resume "resume" => resume, set_resume: bool;
    9 Aborted "aborted" => aborted, set_aborted: bool;
    10 Batchable "batchable" => batchable, set_batchable: bool;
}

described_list! {
    /// Informs the peer of delivery state changes for a range of deliveries.
    pub struct Disposition {
        schema: DispositionSchema,
        fields: DispositionField,
        name: "disposition",
        descriptor: ("amqp:disposition:list", 0x15),
    }
    0 Role "role" => role, set_role: bool, mandatory;
    1 First "first" => first, set_first: u32, mandatory;
    /// Last delivery id of the range, inclusive; `first` when absent.
    2 Last "last" => last, set_last: u32;
    3 Settled "settled" => settled, set_settled: bool;
    4 State "state" => state, set_state: AmqpValue;
    5 Batchable "batchable" => batchable, set_batchable: bool;
}

described_list! {
    /// Detaches a link endpoint from a session.
    pub struct Detach {
        schema: DetachSchema,
        fields: DetachField,
        name: "detach",
        descriptor: ("amqp:detach:list", 0x16),
    }
    0 Handle "handle" => handle, set_handle: u32, mandatory;
    1 Closed "closed" => closed, set_closed: bool;
    2 Error "error" => error, set_error: ErrorInfo;
}

described_list! {
    /// Ends a session.
    pub struct End {
        schema: EndSchema,
        fields: EndField,
        name: "end",
        descriptor: ("amqp:end:list", 0x17),
    }
    0 Error "error" => error, set_error: ErrorInfo;
}

described_list! {
    /// Closes a connection.
    pub struct Close {
        schema: CloseSchema,
        fields: CloseField,
        name: "close",
        descriptor: ("amqp:close:list", 0x18),
    }
    0 Error "error" => error, set_error: ErrorInfo;
}

described_list! {
    /// Marks the end of a transaction branch's portion of work.
    ///
    /// Neither `fail` nor `suspend` set means the work completed.
    pub struct Txn {
        schema: TxnSchema,
        fields: TxnField,
        name: "txn",
        descriptor: ("amqp:txn:list", 0x19),
    }
    0 Options "options" => options, set_options: Map;
    /// The portion of work failed; the transaction may be rolled back.
    1 Fail "fail" => fail, set_fail: bool;
    /// The branch is suspended and may be resumed later.
    2 Suspend "suspend" => suspend, set_suspend: bool;
}
