pub mod host_events;

pub use host_events::{
    ConfirmationRejectedEvent, ErrorEvent, HostEvent, HostEvents, KeysGrantedEvent,
    RequestRejectedEvent, ReservationCancelledEvent, ReservationConfirmedEvent,
    ReservationExpiredEvent,
};
