use booking_admin::memory::MemoryRemote;
use booking_admin::models::format_price;
use booking_admin::{
    logging, FlightPassengers, Flights, FormSession, ListController, Passengers, TransportError,
};
use serde_json::json;

fn show_flights(list: &ListController<Flights>) {
    println!(
        "Flights page {}/{} (search \"{}\"):",
        list.page(),
        list.total_pages().max(1),
        list.search()
    );
    for flight in list.visible_slice() {
        println!(
            "  {} {} {} -> {} {}",
            flight.flight_id,
            flight.airline,
            flight.place_depart,
            flight.destination,
            format_price(flight.price)
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_stderr();

    let remote = MemoryRemote::booking();

    // Add some sample flights
    for (airline, from, to, date, price) in [
        ("KLM", "New York", "London", "2024-08-30", 200.0),
        ("British Airways", "New York", "London", "2024-09-01", 500.0),
        ("Air France", "London", "Paris", "2024-09-02", 300.0),
        ("SAS", "Oslo", "Copenhagen", "2024-09-03", 90.0),
    ] {
        remote.seed(
            "/flights",
            json!({
                "airline": airline, "placeDepart": from, "destination": to,
                "departDate": date, "departTime": "10:00",
                "arrivalDate": date, "arrivalTime": "14:00", "price": price
            }),
        );
    }
    for (first, last, flight) in [("Ann", "Lee", 1), ("Bo", "Ek", 1), ("Cy", "Ng", 3)] {
        remote.seed(
            "/passengers",
            json!({"firstName": first, "lastName": last, "flightId": flight, "numOfBaggage": 1}),
        );
    }

    let mut flights = ListController::<Flights>::new(3);
    flights.load(&remote)?;
    show_flights(&flights);

    // Test paging and search
    flights.next_page();
    show_flights(&flights);
    flights.set_search("london");
    show_flights(&flights);
    flights.set_search("");

    // Test create
    let mut form = FormSession::<Flights>::new();
    form.open_create();
    form.update_field("airline", "Lufthansa")?;
    form.update_field("placeDepart", "Berlin")?;
    form.update_field("destination", "Rome")?;
    form.update_field("price", "149.5")?;
    let outcome = form.submit(&remote, &mut flights)?;
    println!("Create flight: {:?}", outcome);

    // Test edit
    form.open_edit(2, &remote)?;
    form.update_field("price", "450")?;
    let outcome = form.submit(&remote, &mut flights)?;
    println!("Edit flight 2: {:?}", outcome);
    show_flights(&flights);

    // Test validation and a server rejection
    let mut passengers = ListController::<Passengers>::new(5);
    passengers.load(&remote)?;
    let mut passenger_form = FormSession::<Passengers>::new();
    passenger_form.open_create();
    passenger_form.update_field("firstName", "Dee")?;
    let result = passenger_form.submit(&remote, &mut passengers);
    println!("Submit without last name: {:?} / {:?}", result.is_err(), passenger_form.error());

    passenger_form.update_field("lastName", "Ho")?;
    passenger_form.update_field("flightId", "3")?;
    remote.fail_next(TransportError::from_status(400, "Invalid age for passenger"));
    let result = passenger_form.submit(&remote, &mut passengers);
    println!("Submit rejected by server: {:?} / {:?}", result.is_err(), passenger_form.error());
    let outcome = passenger_form.submit(&remote, &mut passengers)?;
    println!("Resubmit: {:?}", outcome);

    // Test drill-down
    let mut detail = FlightPassengers::new(5);
    detail.select(1, &remote)?;
    println!("Passengers of flight 1: {}", detail.children().len());
    detail.select(3, &remote)?;
    println!("Passengers of flight 3: {}", detail.children().len());
    let toggle = detail.select(3, &remote)?;
    println!("Select flight 3 again: {:?}, selected {:?}", toggle, detail.selected());

    // Test delete with and without confirmation
    flights.request_delete(4);
    flights.cancel_delete();
    flights.request_delete(4);
    flights.confirm_delete(&remote)?;
    show_flights(&flights);

    println!("Requests sent:");
    for call in remote.calls() {
        println!("  {:?}", call);
    }
    Ok(())
}
