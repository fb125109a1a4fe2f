use std::io::{self, Write};
use std::path::Path;

use booking_admin::config::Config;
use booking_admin::models::{format_price, FlightRecord, PassengerRecord};
use booking_admin::resource::{display_name, field_text};
use booking_admin::{
    logging, FlightPassengers, Flights, FormSession, HttpRemote, ListController, Mode, Passengers,
    RemoteCollection, Resource, Toggle,
};

/// Reads one trimmed line after printing `label`
fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn confirm(label: &str) -> io::Result<bool> {
    let answer = prompt(&format!("{} (y/n): ", label))?;
    Ok(matches!(answer.as_str(), "y" | "Y" | "yes"))
}

fn prompt_id(label: &str) -> io::Result<Option<i64>> {
    let text = prompt(label)?;
    match text.parse() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            println!("'{}' is not a valid id", text);
            Ok(None)
        }
    }
}

fn print_flight(flight: &FlightRecord) {
    let when = |at: Option<chrono::NaiveDateTime>| {
        at.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    };
    println!(
        "  [{}] {} | {} -> {} | departs {} | arrives {} | {}",
        flight.flight_id,
        flight.airline,
        flight.place_depart,
        flight.destination,
        when(flight.departure()),
        when(flight.arrival()),
        format_price(flight.price)
    );
}

fn print_passenger(passenger: &PassengerRecord) {
    let flight = passenger
        .flight_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  [{}] {} | flight {} | bags {}",
        passenger.passenger_id,
        passenger.full_name(),
        flight,
        passenger.num_of_baggage.unwrap_or(0)
    );
}

fn print_list<R: Resource>(list: &ListController<R>, print: fn(&R::Record)) {
    if let Some(error) = list.error() {
        println!("Error: {}", error);
    }
    let visible = list.visible_slice();
    if visible.is_empty() {
        println!("  (no {})", R::PLURAL);
    }
    for record in visible {
        print(record);
    }
    println!(
        "Page {} of {} ({} matching \"{}\")",
        list.page(),
        list.total_pages().max(1),
        list.filtered().len(),
        list.search()
    );
}

fn print_detail(detail: &FlightPassengers) {
    let Some(flight_id) = detail.selected() else {
        return;
    };
    println!("Passengers for flight {} ({}):", flight_id, detail.children().len());
    if let Some(error) = detail.error() {
        println!("Error: {}", error);
    }
    if detail.children().is_empty() {
        println!("  (no passengers for this flight)");
    }
    for passenger in detail.visible_slice() {
        print_passenger(passenger);
    }
    println!("Page {} of {}", detail.page(), detail.total_pages().max(1));
}

/// Walks the user through every field, then submits; repeats while the
/// user wants to correct a rejected draft
fn fill_and_submit<R: Resource>(
    form: &mut FormSession<R>,
    list: &mut ListController<R>,
    remote: &impl RemoteCollection,
    warn: impl Fn(&FormSession<R>) -> Option<String>,
) -> io::Result<()> {
    loop {
        let heading = match form.mode() {
            Mode::Create => format!("New {}", R::LABEL),
            Mode::Edit => format!("Edit {} {}", R::LABEL, form.editing_id().unwrap_or_default()),
        };
        println!("{} (press enter to keep the value in brackets)", heading);
        for name in R::FIELDS {
            let current = field_text(form.draft(), name);
            let value = prompt(&format!("  {} [{}]: ", display_name(name), current))?;
            if !value.is_empty() {
                if let Err(e) = form.update_field(name, &value) {
                    println!("  {}", e);
                }
            }
        }
        if let Some(warning) = warn(form) {
            println!("Warning: {}", warning);
        }

        match form.submit(remote, list) {
            Ok(_) => {
                println!("Saved.");
                return Ok(());
            }
            Err(_) => {
                println!("Error: {}", form.error().unwrap_or("Failed to save."));
                if !confirm("Correct and resubmit?")? {
                    form.cancel();
                    return Ok(());
                }
            }
        }
    }
}

fn delete_flow<R: Resource>(
    list: &mut ListController<R>,
    remote: &impl RemoteCollection,
) -> io::Result<()> {
    let Some(id) = prompt_id(&format!("Enter {} id: ", R::LABEL))? else {
        return Ok(());
    };
    list.request_delete(id);
    if confirm(&format!("Delete {} {}?", R::LABEL, id))? {
        match list.confirm_delete(remote) {
            Ok(()) => println!("Deleted."),
            Err(_) => println!("Error: {}", list.error().unwrap_or("Delete failed.")),
        }
    } else {
        list.cancel_delete();
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    logging::init(Path::new(&config.client.log_dir))?;

    let remote = HttpRemote::new(&config.server.base_url, config.timeout())?;
    println!("Server address: {}", remote.base_url());

    let mut flights = ListController::<Flights>::new(config.client.flight_page_size);
    let mut passengers = ListController::<Passengers>::new(config.client.passenger_page_size);
    let mut flight_form = FormSession::<Flights>::new();
    let mut passenger_form = FormSession::<Passengers>::new();
    let mut detail = FlightPassengers::new(config.client.detail_page_size);

    if flights.load(&remote).is_err() {
        println!("Error: {}", flights.error().unwrap_or("Failed to load flights."));
    }

    loop {
        println!("----------------------------------");
        println!("Command List:");
        println!("  quit - exit the program");
        println!("  1 - list flights            2 - search flights");
        println!("  3 - next flights page       4 - previous flights page");
        println!("  5 - add flight              6 - edit flight");
        println!("  7 - delete flight           8 - show/hide passengers of a flight");
        println!("  9 - next passengers page of flight   10 - previous passengers page of flight");
        println!("  11 - list passengers        12 - search passengers");
        println!("  13 - next passengers page   14 - previous passengers page");
        println!("  15 - add passenger          16 - edit passenger");
        println!("  17 - delete passenger");
        let command = prompt("Enter command: ")?;

        match command.as_str() {
            "quit" => break,
            "1" => {
                let _ = flights.load(&remote);
                print_list(&flights, print_flight);
            }
            "2" => {
                let text = prompt("Search by airline or city: ")?;
                flights.set_search(&text);
                print_list(&flights, print_flight);
            }
            "3" => {
                if !flights.next_page() {
                    println!("Already on the last page");
                }
                print_list(&flights, print_flight);
            }
            "4" => {
                if !flights.prev_page() {
                    println!("Already on the first page");
                }
                print_list(&flights, print_flight);
            }
            "5" => {
                flight_form.open_create();
                fill_and_submit(&mut flight_form, &mut flights, &remote, |_| None)?;
                print_list(&flights, print_flight);
            }
            "6" => {
                if let Some(id) = prompt_id("Enter flight id: ")? {
                    match flight_form.open_edit(id, &remote) {
                        Ok(()) => {
                            fill_and_submit(&mut flight_form, &mut flights, &remote, |_| None)?;
                            print_list(&flights, print_flight);
                        }
                        Err(_) => println!(
                            "Error: {}",
                            flight_form.error().unwrap_or("Failed to load flight.")
                        ),
                    }
                }
            }
            "7" => {
                delete_flow(&mut flights, &remote)?;
                if let Some(selected) = detail.selected() {
                    if flights.get(selected).is_none() {
                        detail.deselect();
                    }
                }
                print_list(&flights, print_flight);
            }
            "8" => {
                if let Some(id) = prompt_id("Enter flight id: ")? {
                    match detail.select(id, &remote) {
                        Ok(Toggle::Collapsed) => println!("Hid passengers of flight {}", id),
                        _ => print_detail(&detail),
                    }
                }
            }
            "9" => {
                detail.next_page();
                print_detail(&detail);
            }
            "10" => {
                detail.prev_page();
                print_detail(&detail);
            }
            "11" => {
                let _ = passengers.load(&remote);
                print_list(&passengers, print_passenger);
            }
            "12" => {
                let text = prompt("Search by first or last name: ")?;
                passengers.set_search(&text);
                print_list(&passengers, print_passenger);
            }
            "13" => {
                passengers.next_page();
                print_list(&passengers, print_passenger);
            }
            "14" => {
                passengers.prev_page();
                print_list(&passengers, print_passenger);
            }
            "15" | "16" => {
                let opened = if command == "15" {
                    passenger_form.open_create();
                    true
                } else {
                    match prompt_id("Enter passenger id: ")? {
                        Some(id) => match passenger_form.open_edit(id, &remote) {
                            Ok(()) => true,
                            Err(_) => {
                                println!(
                                    "Error: {}",
                                    passenger_form.error().unwrap_or("Failed to load passenger.")
                                );
                                false
                            }
                        },
                        None => false,
                    }
                };
                if opened {
                    let known_flights = flights.ids();
                    fill_and_submit(&mut passenger_form, &mut passengers, &remote, |form| {
                        form.flight_reference_warning(&known_flights)
                    })?;
                    print_list(&passengers, print_passenger);
                }
            }
            "17" => {
                delete_flow(&mut passengers, &remote)?;
                print_list(&passengers, print_passenger);
            }
            other => println!("Unknown command: {}", other),
        }
    }

    Ok(())
}
