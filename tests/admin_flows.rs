use booking_admin::memory::{Call, MemoryRemote};
use booking_admin::{
    AdminError, FlightPassengers, Flights, FormSession, ListController, Passengers, Reconcile,
    RemoteCollection, TransportError,
};
use serde_json::json;

fn booking() -> MemoryRemote {
    let remote = MemoryRemote::booking();
    let cities = ["Oslo", "Paris", "Rome", "Berlin", "Madrid", "Lisbon", "Vienna"];
    for (i, city) in cities.iter().enumerate() {
        remote.seed(
            "/flights",
            json!({
                "airline": if i % 2 == 0 { "Norwegian" } else { "Iberia" },
                "placeDepart": "London",
                "destination": city,
                "departDate": "2024-09-01",
                "departTime": "08:30",
                "price": 100.0 + i as f64
            }),
        );
    }
    let passengers = [("Ann", "Lee", 1), ("Bo", "Ek", 1), ("Cy", "Ng", 2), ("Di", "Leeds", 3)];
    for (first, last, flight) in passengers {
        remote.seed(
            "/passengers",
            json!({"firstName": first, "lastName": last, "flightId": flight}),
        );
    }
    remote
}

#[test]
fn search_result_is_an_ordered_subsequence() {
    let remote = booking();
    let mut list = ListController::<Flights>::new(3);
    list.load(&remote).unwrap();

    for needle in ["", "o", "IBERIA", "lon", "rome", "zzz"] {
        list.set_search(needle);
        let filtered: Vec<i64> = list.filtered().iter().map(|f| f.flight_id).collect();
        let expected: Vec<i64> = list
            .records()
            .iter()
            .filter(|f| {
                let needle = needle.to_lowercase();
                [&f.airline, &f.place_depart, &f.destination]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .map(|f| f.flight_id)
            .collect();
        assert_eq!(filtered, expected, "search {:?}", needle);
        assert!(filtered.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn pages_cover_the_filtered_list_once() {
    let remote = booking();
    for page_size in 1..=8 {
        let mut list = ListController::<Flights>::new(page_size);
        list.load(&remote).unwrap();
        list.set_search("i");

        let expected: Vec<i64> = list.filtered().iter().map(|f| f.flight_id).collect();
        assert_eq!(list.total_pages(), expected.len().div_ceil(page_size));

        let mut seen = Vec::new();
        loop {
            seen.extend(list.visible_slice().iter().map(|f| f.flight_id));
            if !list.next_page() {
                break;
            }
        }
        assert_eq!(seen, expected, "page size {}", page_size);
    }
}

#[test]
fn boundary_paging_leaves_state_unchanged() {
    let remote = booking();
    let mut list = ListController::<Flights>::new(3);
    list.load(&remote).unwrap();

    let before: Vec<i64> = list.visible_slice().iter().map(|f| f.flight_id).collect();
    assert!(!list.prev_page());
    assert_eq!(list.page(), 1);
    assert_eq!(list.visible_slice().iter().map(|f| f.flight_id).collect::<Vec<_>>(), before);

    while list.next_page() {}
    let last_page = list.page();
    assert_eq!(last_page, 3);
    assert!(!list.next_page());
    assert_eq!(list.page(), last_page);
}

#[test]
fn create_flow_posts_once_and_shows_new_record_once() {
    let remote = booking();
    let mut list = ListController::<Passengers>::new(10);
    list.load(&remote).unwrap();
    remote.clear_calls();

    let mut form = FormSession::<Passengers>::new();
    form.open_create();
    form.update_field("firstName", "Ann").unwrap();
    form.update_field("lastName", "Lee").unwrap();
    form.update_field("flightId", "2").unwrap();
    let outcome = form.submit(&remote, &mut list).unwrap();
    assert_eq!(outcome, Reconcile::Patched(5));

    let calls = remote.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        Call::Post(path, body) => {
            assert_eq!(path, "/passengers");
            assert_eq!(body["firstName"], "Ann");
            assert_eq!(body["lastName"], "Lee");
            assert_eq!(body["email"], "");
            assert_eq!(body["numOfBaggage"], 0);
            assert_eq!(body["flightId"], 2);
        }
        other => panic!("expected POST, got {:?}", other),
    }

    let visible = list.visible_slice();
    assert_eq!(visible.iter().filter(|p| p.passenger_id == 5).count(), 1);
    assert!(!form.is_open());
}

#[test]
fn edit_without_changes_puts_the_loaded_fields() {
    let remote = booking();
    let mut list = ListController::<Flights>::new(3);
    list.load(&remote).unwrap();

    let loaded = remote.get("/flights/3").unwrap();
    let mut form = FormSession::<Flights>::new();
    form.open_edit(3, &remote).unwrap();
    remote.clear_calls();
    form.submit(&remote, &mut list).unwrap();

    match &remote.calls()[0] {
        Call::Put(path, body) => {
            assert_eq!(path, "/flights/3");
            let fields = [
                "airline",
                "placeDepart",
                "destination",
                "departDate",
                "departTime",
                "price",
            ];
            for field in fields {
                assert_eq!(body[field], loaded[field], "field {}", field);
            }
            assert!(body.get("flightId").is_none());
        }
        other => panic!("expected PUT, got {:?}", other),
    }
}

#[test]
fn delete_flow_confirms_before_calling() {
    let remote = booking();
    let mut list = ListController::<Passengers>::new(5);
    list.load(&remote).unwrap();
    remote.clear_calls();

    list.request_delete(2);
    list.cancel_delete();
    assert!(remote.calls().is_empty());
    assert_eq!(list.records().len(), 4);

    list.request_delete(2);
    list.confirm_delete(&remote).unwrap();
    assert_eq!(remote.calls(), vec![Call::Delete("/passengers/2".to_string())]);
    let ids: Vec<i64> = list.records().iter().map(|p| p.passenger_id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
}

#[test]
fn failed_reload_keeps_what_was_shown() {
    let remote = booking();
    let mut list = ListController::<Flights>::new(3);
    list.load(&remote).unwrap();
    let shown: Vec<i64> = list.visible_slice().iter().map(|f| f.flight_id).collect();

    remote.fail_next(TransportError::from_status(502, "Bad Gateway"));
    assert!(matches!(list.load(&remote), Err(AdminError::Transport(_))));
    assert!(!list.error().unwrap_or_default().is_empty());
    assert_eq!(list.visible_slice().iter().map(|f| f.flight_id).collect::<Vec<_>>(), shown);
}

#[test]
fn server_flight_not_found_is_shown_friendly() {
    let remote = booking();
    let mut list = ListController::<Passengers>::new(5);
    let mut form = FormSession::<Passengers>::new();
    form.open_create();
    form.update_field("firstName", "Eve").unwrap();
    form.update_field("lastName", "Ox").unwrap();
    form.update_field("flightId", "99").unwrap();

    remote.fail_next(TransportError::from_status(404, "Flight not found"));
    assert!(form.submit(&remote, &mut list).is_err());
    assert_eq!(
        form.error(),
        Some("The selected flight does not exist. Check the flight id.")
    );
    assert!(form.is_open());
}

#[test]
fn drill_down_pages_independently_of_parent_list() {
    let remote = booking();
    let mut flights = ListController::<Flights>::new(3);
    flights.load(&remote).unwrap();
    flights.next_page();

    let mut detail = FlightPassengers::new(1);
    detail.select(1, &remote).unwrap();
    assert_eq!(detail.total_pages(), 2);
    assert!(detail.next_page());
    assert_eq!(detail.visible_slice()[0].first_name, "Bo");

    assert_eq!(flights.page(), 2);
    assert_eq!(detail.page(), 2);
}
