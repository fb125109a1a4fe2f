use std::collections::HashSet;
use std::marker::PhantomData;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{AdminError, Result, TransportError};
use crate::messages::{self, Operation};
use crate::pagination::Pager;
use crate::remote::RemoteCollection;
use crate::resource::Resource;

/// Tag handed out by [`ListController::begin_load`]; a response carrying an
/// older tag than the latest one is dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// ListController owns a fetched collection plus the search and page state
/// used to show it
pub struct ListController<R: Resource> {
    /// Full collection in server order
    records: Vec<R::Record>,
    /// Free-text filter over the resource's search fields
    search: String,
    pager: Pager,
    loading: bool,
    /// User-visible message from the last failed operation
    error: Option<String>,
    /// Generation of the most recent load request or local write
    generation: u64,
    /// Record awaiting delete confirmation
    pending_delete: Option<i64>,
    _resource: PhantomData<R>,
}

impl<R: Resource> ListController<R> {
    /// Creates an empty controller showing `page_size` records per page
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            search: String::new(),
            pager: Pager::new(page_size),
            loading: false,
            error: None,
            generation: 0,
            pending_delete: None,
            _resource: PhantomData,
        }
    }

    pub fn records(&self) -> &[R::Record] {
        &self.records
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    pub fn page_size(&self) -> usize {
        self.pager.page_size()
    }

    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.filtered_len())
    }

    pub fn has_next(&self) -> bool {
        self.pager.has_next(self.filtered_len())
    }

    pub fn has_prev(&self) -> bool {
        self.pager.has_prev()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn get(&self, id: i64) -> Option<&R::Record> {
        self.records.iter().find(|record| R::id(record) == id)
    }

    /// Ids of every loaded record
    pub fn ids(&self) -> HashSet<i64> {
        self.records.iter().map(R::id).collect()
    }

    fn matches(&self, record: &R::Record) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        R::search_fields(record)
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Records matching the search text, in collection order
    pub fn filtered(&self) -> Vec<&R::Record> {
        self.records.iter().filter(|r| self.matches(r)).collect()
    }

    fn filtered_len(&self) -> usize {
        self.records.iter().filter(|r| self.matches(r)).count()
    }

    /// The current page of the filtered records
    pub fn visible_slice(&self) -> Vec<&R::Record> {
        let filtered = self.filtered();
        self.pager.slice(&filtered).to_vec()
    }

    /// Sets the filter text and returns to page 1
    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
        self.pager.reset();
        debug!("{} search set to {:?}", R::PLURAL, self.search);
    }

    pub fn next_page(&mut self) -> bool {
        let len = self.filtered_len();
        self.pager.next(len)
    }

    pub fn prev_page(&mut self) -> bool {
        self.pager.prev()
    }

    /// Marks a load as in flight and returns the tag its response must carry
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        LoadTicket(self.generation)
    }

    /// Applies the response to a load started with `ticket`.
    ///
    /// A stale response is ignored. A failure keeps the current records and
    /// sets the error message.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        response: std::result::Result<Value, TransportError>,
    ) -> Result<()> {
        if ticket.0 != self.generation {
            debug!(
                "dropping stale {} response (ticket {}, current {})",
                R::PLURAL,
                ticket.0,
                self.generation
            );
            return Ok(());
        }
        self.loading = false;

        let decoded = response.and_then(|value| {
            serde_json::from_value::<Vec<R::Record>>(value).map_err(TransportError::from)
        });
        match decoded {
            Ok(records) => {
                debug!("loaded {} {}", records.len(), R::PLURAL);
                self.records = records;
                let len = self.filtered_len();
                self.pager.clamp(len);
                Ok(())
            }
            Err(err) => {
                warn!("loading {} failed: {}", R::PLURAL, err);
                self.error = Some(messages::for_transport(
                    &err,
                    Operation::Load,
                    R::LABEL,
                    R::PLURAL,
                ));
                Err(AdminError::Transport(err))
            }
        }
    }

    /// Fetches the whole collection and replaces the local records
    pub fn load(&mut self, remote: &impl RemoteCollection) -> Result<()> {
        let ticket = self.begin_load();
        let response = remote.get(R::COLLECTION);
        self.finish_load(ticket, response)
    }

    /// Loads still in flight were issued before this local write and would
    /// overwrite it
    fn invalidate_loads(&mut self) {
        if self.loading {
            debug!("{} changed locally; pending load is now stale", R::PLURAL);
        }
        self.generation += 1;
        self.loading = false;
    }

    /// Replaces the record with the same id, or appends it when new
    pub fn upsert(&mut self, record: R::Record) {
        self.invalidate_loads();
        let id = R::id(&record);
        match self.records.iter_mut().find(|r| R::id(r) == id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
        let len = self.filtered_len();
        self.pager.clamp(len);
    }

    /// Removes the record with `id`; returns whether one was present
    pub fn remove(&mut self, id: i64) -> bool {
        self.invalidate_loads();
        let before = self.records.len();
        self.records.retain(|record| R::id(record) != id);
        let len = self.filtered_len();
        self.pager.clamp(len);
        self.records.len() != before
    }

    /// First step of a delete: remember which record the user picked
    pub fn request_delete(&mut self, id: i64) {
        self.pending_delete = Some(id);
    }

    /// Declines the pending delete without contacting the server
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the pending record on the server, then locally
    pub fn confirm_delete(&mut self, remote: &impl RemoteCollection) -> Result<()> {
        let id = self.pending_delete.take().ok_or(AdminError::NoPendingDelete)?;
        self.error = None;
        match remote.delete(&R::item_path(id)) {
            Ok(()) => {
                self.remove(id);
                info!("deleted {} {}", R::LABEL, id);
                Ok(())
            }
            Err(err) => {
                warn!("deleting {} {} failed: {}", R::LABEL, id, err);
                self.error = Some(messages::for_transport(
                    &err,
                    Operation::Delete,
                    R::LABEL,
                    R::PLURAL,
                ));
                Err(AdminError::Transport(err))
            }
        }
    }
}
