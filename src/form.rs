use std::collections::HashSet;
use std::fmt;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{AdminError, Result, TransportError};
use crate::list::ListController;
use crate::messages::{self, Operation};
use crate::remote::RemoteCollection;
use crate::resource::{Passengers, Resource};

/// Whether the form creates a new record or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Edit,
}

/// Where the form is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Closed, draft at defaults
    Idle,
    /// Open and accepting field changes
    Editing,
    /// A write has been sent and its response is pending
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
        }
    }
}

/// Tag handed out by [`FormSession::begin_submit`]; a response carrying a
/// tag other than the current one is dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket(u64);

/// The write a submit sends
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub ticket: SubmitTicket,
    pub method: Method,
    pub path: String,
    pub body: Value,
}

/// How the list was brought up to date after a successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// The server returned the record and it was patched into the list
    Patched(i64),
    /// The response carried no usable record; the list must be reloaded
    ReloadNeeded,
    /// The response belonged to a submit the form has since moved past
    Stale,
}

/// Create/edit form for one resource type
pub struct FormSession<R: Resource> {
    phase: Phase,
    mode: Mode,
    editing_id: Option<i64>,
    draft: R::Draft,
    error: Option<String>,
    /// Bumped whenever the form opens, closes or submits
    generation: u64,
}

impl<R: Resource> Default for FormSession<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> FormSession<R> {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            mode: Mode::Create,
            editing_id: None,
            draft: R::Draft::default(),
            error: None,
            generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing_id
    }

    pub fn draft(&self) -> &R::Draft {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.phase = Phase::Idle;
        self.mode = Mode::Create;
        self.editing_id = None;
        self.draft = R::Draft::default();
    }

    /// Opens an empty form for a new record
    pub fn open_create(&mut self) {
        self.reset();
        self.error = None;
        self.phase = Phase::Editing;
        debug!("{} form opened for create", R::LABEL);
    }

    /// Fetches the record and opens the form on it.
    ///
    /// On failure the form stays closed and the error message is set.
    pub fn open_edit(&mut self, id: i64, remote: &impl RemoteCollection) -> Result<()> {
        self.error = None;
        let record = remote.get(&R::item_path(id)).and_then(|value| {
            serde_json::from_value::<R::Record>(value).map_err(TransportError::from)
        });

        match record {
            Ok(record) => {
                self.generation += 1;
                self.draft = R::to_draft(&record);
                self.mode = Mode::Edit;
                self.editing_id = Some(id);
                self.phase = Phase::Editing;
                debug!("{} form opened for edit of {}", R::LABEL, id);
                Ok(())
            }
            Err(err) => {
                warn!("loading {} {} for edit failed: {}", R::LABEL, id, err);
                self.error = Some(format!("Failed to load {} {}.", R::LABEL, id));
                Err(AdminError::Load(err))
            }
        }
    }

    /// Writes one form input into the draft
    pub fn update_field(&mut self, name: &str, value: &str) -> Result<()> {
        if self.phase != Phase::Editing {
            return Err(AdminError::NotEditing);
        }
        R::set_field(&mut self.draft, name, value)
    }

    /// Checks the draft and builds the write to send.
    ///
    /// Moves the form to [`Phase::Submitting`]. Fails with a validation
    /// error, and stays in [`Phase::Editing`], when a required field is
    /// missing.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest> {
        if self.phase != Phase::Editing {
            return Err(AdminError::NotEditing);
        }
        if let Err(err) = R::validate(&self.draft) {
            self.error = Some(err.to_string());
            return Err(err);
        }
        let body = serde_json::to_value(&self.draft).map_err(TransportError::from)?;

        self.generation += 1;
        let ticket = SubmitTicket(self.generation);
        let request = match (self.mode, self.editing_id) {
            (Mode::Edit, Some(id)) => SubmitRequest {
                ticket,
                method: Method::Put,
                path: R::item_path(id),
                body,
            },
            _ => SubmitRequest {
                ticket,
                method: Method::Post,
                path: R::COLLECTION.to_string(),
                body,
            },
        };
        self.error = None;
        self.phase = Phase::Submitting;
        Ok(request)
    }

    /// Applies the server's answer to the submit started with `ticket`.
    ///
    /// Success patches the list and closes the form. Failure reopens the
    /// form with the draft intact and a message for the user. An answer to
    /// a submit that was cancelled or superseded touches nothing and
    /// reports [`Reconcile::Stale`].
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        response: std::result::Result<Value, TransportError>,
        list: &mut ListController<R>,
    ) -> Result<Reconcile> {
        if self.phase != Phase::Submitting || ticket.0 != self.generation {
            debug!(
                "dropping stale {} save response (ticket {}, current {}, {:?})",
                R::LABEL,
                ticket.0,
                self.generation,
                self.phase
            );
            return Ok(Reconcile::Stale);
        }
        match response {
            Ok(value) => {
                let reconcile = match serde_json::from_value::<R::Record>(value) {
                    Ok(record) => {
                        let id = R::id(&record);
                        list.upsert(record);
                        Reconcile::Patched(id)
                    }
                    Err(_) => Reconcile::ReloadNeeded,
                };
                info!("{} saved ({:?})", R::LABEL, reconcile);
                self.reset();
                self.error = None;
                Ok(reconcile)
            }
            Err(err) => {
                warn!("saving {} failed: {}", R::LABEL, err);
                self.phase = Phase::Editing;
                let message = messages::for_transport(&err, Operation::Save, R::LABEL, R::PLURAL);
                self.error = Some(message);
                Err(AdminError::Transport(err))
            }
        }
    }

    /// Validates, sends POST or PUT, and reconciles the list
    pub fn submit(
        &mut self,
        remote: &impl RemoteCollection,
        list: &mut ListController<R>,
    ) -> Result<Reconcile> {
        let request = self.begin_submit()?;
        debug!("{} {}", request.method, request.path);
        let response = match request.method {
            Method::Post => remote.post(&request.path, &request.body),
            Method::Put => remote.put(&request.path, &request.body),
        };
        let reconcile = self.finish_submit(request.ticket, response, list)?;
        if reconcile == Reconcile::ReloadNeeded {
            // the write went through; a failed reload only affects the list
            let _ = list.load(remote);
        }
        Ok(reconcile)
    }

    /// Closes the form and drops the draft; nothing is sent
    pub fn cancel(&mut self) {
        self.reset();
        self.error = None;
        debug!("{} form cancelled", R::LABEL);
    }
}

impl FormSession<Passengers> {
    /// Advisory check of the flight reference against flights known locally.
    ///
    /// The server has the final say, so this only produces a warning.
    pub fn flight_reference_warning(&self, known_flights: &HashSet<i64>) -> Option<String> {
        match self.draft.flight_id {
            Some(id) if !known_flights.contains(&id) => {
                Some(format!("Flight {} is not in the current flight list.", id))
            }
            _ => None,
        }
    }
}
