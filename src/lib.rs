//! Controllers behind the flight and passenger admin screens.
//!
//! A [`ListController`] holds a fetched collection with search and paging,
//! a [`FormSession`] drives create/edit of one record, and a
//! [`DetailDrillDown`] shows the children of a selected parent. All three
//! talk to the backend through a [`RemoteCollection`].

pub mod config;
pub mod drilldown;
pub mod error;
pub mod form;
pub mod list;
pub mod logging;
pub mod memory;
pub mod messages;
pub mod models;
pub mod pagination;
pub mod remote;
pub mod resource;

pub use drilldown::{DetailDrillDown, Toggle};
pub use error::{AdminError, Result, TransportError};
pub use form::{FormSession, Mode, Phase, Reconcile, SubmitRequest, SubmitTicket};
pub use list::ListController;
pub use memory::MemoryRemote;
pub use models::{FlightDraft, FlightRecord, PassengerDraft, PassengerRecord};
pub use remote::{HttpRemote, RemoteCollection};
pub use resource::{Flights, Passengers, Resource};

/// Passengers listed under a selected flight
pub type FlightPassengers = DetailDrillDown<Flights, Passengers>;
