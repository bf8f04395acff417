use bytes::{Buf, BufMut, BytesMut};

use crate::{messages::error::MessageError, CorrelationId, KeyId, NamespaceFilter};

const CORRELATION_ID_BYTES: usize = 16;

/// Which peer a message is addressed to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageDirection {
    ToHost,
    ToClient,
}

/// Messages exchanged by the key allocation protocol.
///
/// Every message carries the `request` correlation id chosen by the client when
/// it started the exchange, so concurrent requests from one client never get
/// confused with each other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocationMessage {
    /// Client asks the host for `count` keys in `namespace`
    RequestKeys {
        request: CorrelationId,
        count: u8,
        namespace: NamespaceFilter,
    },
    /// Host tentatively grants `keys`; the client must confirm in time
    KeysGranted {
        request: CorrelationId,
        keys: Vec<KeyId>,
    },
    /// Host could not satisfy the requested count
    RequestRejected { request: CorrelationId },
    /// Client acknowledges a grant
    ConfirmReservation { request: CorrelationId },
    /// Host accepted the confirmation, the keys are now leased
    ConfirmationAccepted { request: CorrelationId },
    /// Confirmation arrived after the reservation expired
    ConfirmationRejected { request: CorrelationId },
    /// Client gives up a granted (or confirmed) batch
    CancelReservation { request: CorrelationId },
}

impl AllocationMessage {
    pub fn request(&self) -> &CorrelationId {
        match self {
            AllocationMessage::RequestKeys { request, .. }
            | AllocationMessage::KeysGranted { request, .. }
            | AllocationMessage::RequestRejected { request }
            | AllocationMessage::ConfirmReservation { request }
            | AllocationMessage::ConfirmationAccepted { request }
            | AllocationMessage::ConfirmationRejected { request }
            | AllocationMessage::CancelReservation { request } => request,
        }
    }

    pub fn direction(&self) -> MessageDirection {
        match self {
            AllocationMessage::RequestKeys { .. }
            | AllocationMessage::ConfirmReservation { .. }
            | AllocationMessage::CancelReservation { .. } => MessageDirection::ToHost,
            AllocationMessage::KeysGranted { .. }
            | AllocationMessage::RequestRejected { .. }
            | AllocationMessage::ConfirmationAccepted { .. }
            | AllocationMessage::ConfirmationRejected { .. } => MessageDirection::ToClient,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AllocationMessage::RequestKeys { .. } => "RequestKeys",
            AllocationMessage::KeysGranted { .. } => "KeysGranted",
            AllocationMessage::RequestRejected { .. } => "RequestRejected",
            AllocationMessage::ConfirmReservation { .. } => "ConfirmReservation",
            AllocationMessage::ConfirmationAccepted { .. } => "ConfirmationAccepted",
            AllocationMessage::ConfirmationRejected { .. } => "ConfirmationRejected",
            AllocationMessage::CancelReservation { .. } => "CancelReservation",
        }
    }

    fn tag(&self) -> u8 {
        match self {
            AllocationMessage::RequestKeys { .. } => 1,
            AllocationMessage::KeysGranted { .. } => 2,
            AllocationMessage::RequestRejected { .. } => 3,
            AllocationMessage::ConfirmReservation { .. } => 4,
            AllocationMessage::ConfirmationAccepted { .. } => 5,
            AllocationMessage::ConfirmationRejected { .. } => 6,
            AllocationMessage::CancelReservation { .. } => 7,
        }
    }

    // Serialization

    /// Layout: `[tag][request: 16 bytes][payload]`
    pub fn ser(&self, writer: &mut BytesMut) -> Result<(), MessageError> {
        writer.put_u8(self.tag());
        writer.put_slice(self.request().as_bytes());

        match self {
            AllocationMessage::RequestKeys {
                count, namespace, ..
            } => {
                writer.put_u8(*count);
                ser_namespace(namespace, writer);
            }
            AllocationMessage::KeysGranted { keys, .. } => {
                let Ok(length) = u8::try_from(keys.len()) else {
                    return Err(MessageError::TooManyKeys { count: keys.len() });
                };
                writer.put_u8(length);
                writer.put_slice(keys);
            }
            _ => {}
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, MessageError> {
        let mut writer = BytesMut::with_capacity(self.byte_length());
        self.ser(&mut writer)?;
        Ok(writer.to_vec())
    }

    pub fn byte_length(&self) -> usize {
        let payload = match self {
            AllocationMessage::RequestKeys { namespace, .. } => {
                1 + match namespace {
                    NamespaceFilter::Custom(_) => 3,
                    _ => 1,
                }
            }
            AllocationMessage::KeysGranted { keys, .. } => 1 + keys.len(),
            _ => 0,
        };
        1 + CORRELATION_ID_BYTES + payload
    }

    /// Decodes exactly one message; the payload must not contain anything else
    pub fn de(payload: &[u8]) -> Result<Self, MessageError> {
        let mut reader = payload;

        ensure_remaining(&reader, 1 + CORRELATION_ID_BYTES)?;
        let tag = reader.get_u8();
        let mut request_bytes = [0u8; CORRELATION_ID_BYTES];
        reader.copy_to_slice(&mut request_bytes);
        let request = CorrelationId::from_bytes(request_bytes);

        let message = match tag {
            1 => {
                ensure_remaining(&reader, 1)?;
                let count = reader.get_u8();
                let namespace = de_namespace(&mut reader)?;
                AllocationMessage::RequestKeys {
                    request,
                    count,
                    namespace,
                }
            }
            2 => {
                ensure_remaining(&reader, 1)?;
                let length = reader.get_u8() as usize;
                ensure_remaining(&reader, length)?;
                let mut keys = vec![0; length];
                reader.copy_to_slice(&mut keys);
                AllocationMessage::KeysGranted { request, keys }
            }
            3 => AllocationMessage::RequestRejected { request },
            4 => AllocationMessage::ConfirmReservation { request },
            5 => AllocationMessage::ConfirmationAccepted { request },
            6 => AllocationMessage::ConfirmationRejected { request },
            7 => AllocationMessage::CancelReservation { request },
            // SECURITY: unknown tags come from malformed or malicious peers, never panic
            _ => return Err(MessageError::InvalidTag { tag }),
        };

        if reader.has_remaining() {
            return Err(MessageError::TrailingBytes {
                count: reader.remaining(),
            });
        }

        Ok(message)
    }
}

fn ser_namespace(namespace: &NamespaceFilter, writer: &mut BytesMut) {
    match namespace {
        NamespaceFilter::Room => writer.put_u8(0),
        NamespaceFilter::Player => writer.put_u8(1),
        NamespaceFilter::Custom(value) => {
            writer.put_u8(2);
            writer.put_u16(*value);
        }
    }
}

fn de_namespace(reader: &mut &[u8]) -> Result<NamespaceFilter, MessageError> {
    ensure_remaining(reader, 1)?;
    match reader.get_u8() {
        0 => Ok(NamespaceFilter::Room),
        1 => Ok(NamespaceFilter::Player),
        2 => {
            ensure_remaining(reader, 2)?;
            Ok(NamespaceFilter::Custom(reader.get_u16()))
        }
        tag => Err(MessageError::InvalidNamespace { tag }),
    }
}

fn ensure_remaining(reader: &&[u8], needed: usize) -> Result<(), MessageError> {
    let remaining = reader.remaining();
    if remaining < needed {
        return Err(MessageError::Truncated {
            needed,
            remaining,
        });
    }
    Ok(())
}
