//! Per-entity configuration shared by the list, form and drill-down
//! controllers: endpoint path, searchable fields, draft mapping and the
//! local validation rules.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AdminError, Result};
use crate::models::{FlightDraft, FlightRecord, PassengerDraft, PassengerRecord, MAX_BAGGAGE};

/// An entity type managed through a REST collection
pub trait Resource {
    /// Record shape returned by the server
    type Record: Clone + Debug + DeserializeOwned;
    /// Writable fields, used as the POST/PUT body
    type Draft: Clone + Debug + Default + PartialEq + Serialize;

    /// Collection path, e.g. `/flights`
    const COLLECTION: &'static str;
    /// Singular noun used in messages
    const LABEL: &'static str;
    /// Plural noun used in messages
    const PLURAL: &'static str;
    /// Writable JSON field names, in form order
    const FIELDS: &'static [&'static str];

    fn id(record: &Self::Record) -> i64;

    /// Text fields matched by the search box
    fn search_fields(record: &Self::Record) -> Vec<&str>;

    fn to_draft(record: &Self::Record) -> Self::Draft;

    /// Writes one text input into the draft, coercing numeric fields
    fn set_field(draft: &mut Self::Draft, name: &str, value: &str) -> Result<()>;

    /// Fields that must be non-empty before submitting
    fn required_fields(draft: &Self::Draft) -> Vec<(&'static str, bool)>;

    fn item_path(id: i64) -> String {
        format!("{}/{}", Self::COLLECTION, id)
    }

    /// Checks required fields; the first missing one is reported
    fn validate(draft: &Self::Draft) -> Result<()> {
        match Self::required_fields(draft)
            .into_iter()
            .find(|(_, present)| !present)
        {
            Some((name, _)) => Err(AdminError::Validation(format!(
                "{} is required.",
                display_name(name)
            ))),
            None => Ok(()),
        }
    }
}

/// Turns a camelCase field name into words: `firstName` -> `First name`
pub fn display_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for (i, c) in field.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Current value of one draft field as form text (`null` shows as empty)
pub fn field_text<D: Serialize>(draft: &D, name: &str) -> String {
    match serde_json::to_value(draft).ok().and_then(|body| body.get(name).cloned()) {
        Some(serde_json::Value::String(text)) => text,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn present(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Number input: empty text is 0, anything unparseable becomes NaN
fn coerce_price(value: &str) -> f64 {
    let value = value.trim();
    if value.is_empty() {
        return 0.0;
    }
    value.parse().unwrap_or(f64::NAN)
}

/// Bag count input: invalid text becomes 0, range limited to 0..=MAX_BAGGAGE
fn coerce_baggage(value: &str) -> u8 {
    value
        .trim()
        .parse::<i64>()
        .map(|n| n.clamp(0, MAX_BAGGAGE as i64) as u8)
        .unwrap_or(0)
}

/// Flight reference input: empty leaves it unset, invalid text becomes 0
fn coerce_flight_ref(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.parse().unwrap_or(0))
    }
}

/// Flights managed under `/flights`
#[derive(Debug, Clone, Copy)]
pub struct Flights;

impl Resource for Flights {
    type Record = FlightRecord;
    type Draft = FlightDraft;

    const COLLECTION: &'static str = "/flights";
    const LABEL: &'static str = "flight";
    const PLURAL: &'static str = "flights";
    const FIELDS: &'static [&'static str] = &[
        "airline",
        "placeDepart",
        "departDate",
        "departTime",
        "destination",
        "arrivalDate",
        "arrivalTime",
        "price",
    ];

    fn id(record: &FlightRecord) -> i64 {
        record.flight_id
    }

    fn search_fields(record: &FlightRecord) -> Vec<&str> {
        vec![
            record.airline.as_str(),
            record.place_depart.as_str(),
            record.destination.as_str(),
        ]
    }

    fn to_draft(record: &FlightRecord) -> FlightDraft {
        FlightDraft::from(record)
    }

    fn set_field(draft: &mut FlightDraft, name: &str, value: &str) -> Result<()> {
        let slot = match name {
            "airline" => &mut draft.airline,
            "placeDepart" => &mut draft.place_depart,
            "departDate" => &mut draft.depart_date,
            "departTime" => &mut draft.depart_time,
            "destination" => &mut draft.destination,
            "arrivalDate" => &mut draft.arrival_date,
            "arrivalTime" => &mut draft.arrival_time,
            "price" => {
                draft.price = coerce_price(value);
                return Ok(());
            }
            other => return Err(AdminError::UnknownField(other.to_string())),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn required_fields(draft: &FlightDraft) -> Vec<(&'static str, bool)> {
        vec![
            ("airline", present(&draft.airline)),
            ("placeDepart", present(&draft.place_depart)),
            ("destination", present(&draft.destination)),
        ]
    }
}

/// Passengers managed under `/passengers`
#[derive(Debug, Clone, Copy)]
pub struct Passengers;

impl Resource for Passengers {
    type Record = PassengerRecord;
    type Draft = PassengerDraft;

    const COLLECTION: &'static str = "/passengers";
    const LABEL: &'static str = "passenger";
    const PLURAL: &'static str = "passengers";
    const FIELDS: &'static [&'static str] = &[
        "firstName",
        "lastName",
        "dateOfBirth",
        "gender",
        "address",
        "phoneNumber",
        "email",
        "passportNumber",
        "passportExpiryDate",
        "creditCardNumber",
        "numOfBaggage",
        "flightId",
    ];

    fn id(record: &PassengerRecord) -> i64 {
        record.passenger_id
    }

    fn search_fields(record: &PassengerRecord) -> Vec<&str> {
        vec![record.first_name.as_str(), record.last_name.as_str()]
    }

    fn to_draft(record: &PassengerRecord) -> PassengerDraft {
        PassengerDraft::from(record)
    }

    fn set_field(draft: &mut PassengerDraft, name: &str, value: &str) -> Result<()> {
        let slot = match name {
            "firstName" => &mut draft.first_name,
            "lastName" => &mut draft.last_name,
            "dateOfBirth" => &mut draft.date_of_birth,
            "gender" => &mut draft.gender,
            "address" => &mut draft.address,
            "phoneNumber" => &mut draft.phone_number,
            "email" => &mut draft.email,
            "passportNumber" => &mut draft.passport_number,
            "passportExpiryDate" => &mut draft.passport_expiry_date,
            "creditCardNumber" => &mut draft.credit_card_number,
            "numOfBaggage" => {
                draft.num_of_baggage = coerce_baggage(value);
                return Ok(());
            }
            "flightId" => {
                draft.flight_id = coerce_flight_ref(value);
                return Ok(());
            }
            other => return Err(AdminError::UnknownField(other.to_string())),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn required_fields(draft: &PassengerDraft) -> Vec<(&'static str, bool)> {
        vec![
            ("firstName", present(&draft.first_name)),
            ("lastName", present(&draft.last_name)),
            ("flightId", draft.flight_id.is_some()),
        ]
    }
}
