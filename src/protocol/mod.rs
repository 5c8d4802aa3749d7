//! Host-facing wire types: method calls, event records and stable codes.

mod codes;
mod method_call;
mod records;

pub use codes::{
    category_code, category_code_for_name, operation_code, operation_code_for_name,
    OperationType, StatusCategory,
};
pub use method_call::{Method, MethodCall, MethodResult, CLIENT_NAME_KEY, METHOD_CHANNEL_NAME};
pub use records::{ErrorRecord, EventRecord, MessageRecord, PresenceRecord, StatusRecord};
