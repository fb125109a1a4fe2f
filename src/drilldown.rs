use std::marker::PhantomData;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AdminError, Result, TransportError};
use crate::messages::{self, Operation};
use crate::pagination::Pager;
use crate::remote::RemoteCollection;
use crate::resource::Resource;

/// Tag for a child fetch: the parent it was made for and the request generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildTicket {
    pub parent_id: i64,
    generation: u64,
}

/// Result of selecting a parent row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The parent is now selected and its children were requested
    Expanded,
    /// The parent was already selected; the selection was cleared
    Collapsed,
}

/// Children of one selected parent, e.g. the passengers of a flight,
/// fetched from `{P::COLLECTION}/{id}{C::COLLECTION}` and paged on their own
pub struct DetailDrillDown<P: Resource, C: Resource> {
    selected: Option<i64>,
    children: Vec<C::Record>,
    pager: Pager,
    loading: bool,
    error: Option<String>,
    generation: u64,
    _parent: PhantomData<P>,
}

impl<P: Resource, C: Resource> DetailDrillDown<P, C> {
    pub fn new(page_size: usize) -> Self {
        Self {
            selected: None,
            children: Vec::new(),
            pager: Pager::new(page_size),
            loading: false,
            error: None,
            generation: 0,
            _parent: PhantomData,
        }
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn children(&self) -> &[C::Record] {
        &self.children
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.children.len())
    }

    pub fn has_next(&self) -> bool {
        self.pager.has_next(self.children.len())
    }

    pub fn has_prev(&self) -> bool {
        self.pager.has_prev()
    }

    pub fn visible_slice(&self) -> &[C::Record] {
        self.pager.slice(&self.children)
    }

    pub fn next_page(&mut self) -> bool {
        self.pager.next(self.children.len())
    }

    pub fn prev_page(&mut self) -> bool {
        self.pager.prev()
    }

    /// Selects `parent_id`, or collapses it when it is already selected.
    ///
    /// Returns the ticket the child response must be applied with, or `None`
    /// on collapse.
    pub fn begin_select(&mut self, parent_id: i64) -> Option<ChildTicket> {
        if self.selected == Some(parent_id) {
            self.deselect();
            return None;
        }
        self.generation += 1;
        self.selected = Some(parent_id);
        self.children.clear();
        self.pager.reset();
        self.loading = true;
        self.error = None;
        debug!("{} {} selected", P::LABEL, parent_id);
        Some(ChildTicket {
            parent_id,
            generation: self.generation,
        })
    }

    /// Applies a child response; ignored when the selection has moved on
    pub fn finish_select(
        &mut self,
        ticket: ChildTicket,
        response: std::result::Result<Value, TransportError>,
    ) -> Result<()> {
        if ticket.generation != self.generation || self.selected != Some(ticket.parent_id) {
            debug!(
                "dropping stale {} response for {} {}",
                C::PLURAL,
                P::LABEL,
                ticket.parent_id
            );
            return Ok(());
        }
        self.loading = false;

        let decoded = response.and_then(|value| {
            serde_json::from_value::<Vec<C::Record>>(value).map_err(TransportError::from)
        });
        match decoded {
            Ok(children) => {
                debug!(
                    "loaded {} {} for {} {}",
                    children.len(),
                    C::PLURAL,
                    P::LABEL,
                    ticket.parent_id
                );
                self.children = children;
                Ok(())
            }
            Err(err) => {
                warn!("loading {} of {} {} failed: {}", C::PLURAL, P::LABEL, ticket.parent_id, err);
                self.error = Some(messages::for_transport(
                    &err,
                    Operation::LoadChildren,
                    C::LABEL,
                    C::PLURAL,
                ));
                Err(AdminError::Transport(err))
            }
        }
    }

    /// Selects a parent and fetches its children, or collapses the current one
    pub fn select(&mut self, parent_id: i64, remote: &impl RemoteCollection) -> Result<Toggle> {
        match self.begin_select(parent_id) {
            Some(ticket) => {
                let response = remote.get_child_of(P::COLLECTION, parent_id, C::COLLECTION);
                self.finish_select(ticket, response)?;
                Ok(Toggle::Expanded)
            }
            None => Ok(Toggle::Collapsed),
        }
    }

    /// Clears the selection and drops the fetched children
    pub fn deselect(&mut self) {
        // invalidates any fetch still in flight
        self.generation += 1;
        self.selected = None;
        self.children.clear();
        self.pager.reset();
        self.loading = false;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRemote;
    use crate::resource::{Flights, Passengers};
    use serde_json::json;

    type FlightPassengers = DetailDrillDown<Flights, Passengers>;

    fn booking() -> MemoryRemote {
        let remote = MemoryRemote::booking();
        let a = remote.seed("/flights", json!({"airline": "KLM"}));
        let b = remote.seed("/flights", json!({"airline": "SAS"}));
        for i in 0..7 {
            remote.seed(
                "/passengers",
                json!({"firstName": format!("A{}", i), "lastName": "X", "flightId": a}),
            );
        }
        remote.seed("/passengers", json!({"firstName": "B", "lastName": "Y", "flightId": b}));
        remote
    }

    #[test]
    fn select_fetches_children_of_parent() {
        let remote = booking();
        let mut detail = FlightPassengers::new(5);
        assert_eq!(detail.select(1, &remote).unwrap(), Toggle::Expanded);
        assert_eq!(detail.selected(), Some(1));
        assert_eq!(detail.children().len(), 7);
        assert_eq!(detail.total_pages(), 2);
        assert_eq!(detail.visible_slice().len(), 5);
        assert_eq!(remote.count("GET"), 1);
    }

    #[test]
    fn selecting_same_parent_collapses() {
        let remote = booking();
        let mut detail = FlightPassengers::new(5);
        detail.select(1, &remote).unwrap();
        assert_eq!(detail.select(1, &remote).unwrap(), Toggle::Collapsed);
        assert_eq!(detail.selected(), None);
        assert!(detail.children().is_empty());
        assert_eq!(remote.count("GET"), 1);
    }

    #[test]
    fn switching_parent_refetches_and_resets_page() {
        let remote = booking();
        let mut detail = FlightPassengers::new(5);
        detail.select(1, &remote).unwrap();
        assert!(detail.next_page());
        assert_eq!(detail.page(), 2);

        detail.select(2, &remote).unwrap();
        assert_eq!(detail.page(), 1);
        assert_eq!(detail.children().len(), 1);
        assert_eq!(detail.children()[0].first_name, "B");
        assert_eq!(remote.count("GET"), 2);
    }

    #[test]
    fn child_paging_is_clamped() {
        let remote = booking();
        let mut detail = FlightPassengers::new(5);
        detail.select(1, &remote).unwrap();
        assert!(!detail.prev_page());
        assert!(detail.next_page());
        assert_eq!(detail.visible_slice().len(), 2);
        assert!(!detail.next_page());
    }

    #[test]
    fn response_for_previous_parent_is_dropped() {
        let mut detail = FlightPassengers::new(5);
        let old = detail.begin_select(1).unwrap();
        let new = detail.begin_select(2).unwrap();

        let fresh = json!([{"passengerId": 9, "firstName": "B", "lastName": "Y", "flightId": 2}]);
        let late = json!([{"passengerId": 1, "firstName": "A", "lastName": "X", "flightId": 1}]);
        detail.finish_select(new, Ok(fresh)).unwrap();
        detail.finish_select(old, Ok(late)).unwrap();

        assert_eq!(detail.selected(), Some(2));
        assert_eq!(detail.children().len(), 1);
        assert_eq!(detail.children()[0].passenger_id, 9);
    }

    #[test]
    fn response_after_deselect_is_dropped() {
        let mut detail = FlightPassengers::new(5);
        let ticket = detail.begin_select(1).unwrap();
        detail.deselect();
        let late = json!([{"passengerId": 1, "firstName": "A", "lastName": "X"}]);
        detail.finish_select(ticket, Ok(late)).unwrap();
        assert!(detail.children().is_empty());
        assert!(!detail.is_loading());
    }

    #[test]
    fn failed_fetch_sets_error() {
        let remote = booking();
        let mut detail = FlightPassengers::new(5);
        remote.fail_next(TransportError::Network("timeout".into()));
        assert!(detail.select(1, &remote).is_err());
        assert_eq!(detail.selected(), Some(1));
        assert_eq!(detail.error(), Some("Failed to load passengers."));
    }
}
