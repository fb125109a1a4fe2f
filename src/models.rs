use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Treats a JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A flight as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    pub flight_id: i64,                   // Assigned by the server, never changed locally
    #[serde(default, deserialize_with = "null_as_default")]
    pub airline: String,                  // Operating airline
    #[serde(default, deserialize_with = "null_as_default")]
    pub place_depart: String,             // Departure place
    #[serde(default, deserialize_with = "null_as_default")]
    pub depart_date: String,              // YYYY-MM-DD
    #[serde(default, deserialize_with = "null_as_default")]
    pub depart_time: String,              // HH:MM
    #[serde(default, deserialize_with = "null_as_default")]
    pub destination: String,              // Arrival place
    #[serde(default, deserialize_with = "null_as_default")]
    pub arrival_date: String,             // YYYY-MM-DD
    #[serde(default, deserialize_with = "null_as_default")]
    pub arrival_time: String,             // HH:MM
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,                       // Display only, no arithmetic
}

impl FlightRecord {
    /// Scheduled departure, when both date and time parse
    pub fn departure(&self) -> Option<NaiveDateTime> {
        combine_date_time(&self.depart_date, &self.depart_time)
    }

    /// Scheduled arrival, when both date and time parse
    pub fn arrival(&self) -> Option<NaiveDateTime> {
        combine_date_time(&self.arrival_date, &self.arrival_time)
    }
}

/// Writable fields of a flight, sent as the POST/PUT body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDraft {
    pub airline: String,
    pub place_depart: String,
    pub depart_date: String,
    pub depart_time: String,
    pub destination: String,
    pub arrival_date: String,
    pub arrival_time: String,
    pub price: f64,
}

impl From<&FlightRecord> for FlightDraft {
    fn from(record: &FlightRecord) -> Self {
        FlightDraft {
            airline: record.airline.clone(),
            place_depart: record.place_depart.clone(),
            depart_date: record.depart_date.clone(),
            depart_time: record.depart_time.clone(),
            destination: record.destination.clone(),
            arrival_date: record.arrival_date.clone(),
            arrival_time: record.arrival_time.clone(),
            price: record.price,
        }
    }
}

/// A passenger as returned by the server.
///
/// Only the id, names and flight reference are guaranteed; everything else
/// may be absent or null depending on the endpoint that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerRecord {
    pub passenger_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub passport_number: Option<String>,
    #[serde(default)]
    pub passport_expiry_date: Option<String>,
    #[serde(default)]
    pub credit_card_number: Option<String>,
    #[serde(default)]
    pub num_of_baggage: Option<u8>,
    #[serde(default)]
    pub flight_id: Option<i64>,
}

impl PassengerRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Writable fields of a passenger, sent as the POST/PUT body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerDraft {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub passport_number: String,
    pub passport_expiry_date: String,
    pub credit_card_number: String,
    pub num_of_baggage: u8,
    pub flight_id: Option<i64>,
}

/// Upper bound on checked bags accepted by the form
pub const MAX_BAGGAGE: u8 = 4;

impl From<&PassengerRecord> for PassengerDraft {
    fn from(record: &PassengerRecord) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        PassengerDraft {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            date_of_birth: text(&record.date_of_birth),
            gender: text(&record.gender),
            address: text(&record.address),
            phone_number: text(&record.phone_number),
            email: text(&record.email),
            passport_number: text(&record.passport_number),
            passport_expiry_date: text(&record.passport_expiry_date),
            credit_card_number: text(&record.credit_card_number),
            num_of_baggage: record.num_of_baggage.unwrap_or(0),
            flight_id: record.flight_id,
        }
    }
}

/// Formats a price as dollars with thousands separators, e.g. `$1,234.50`
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return "-".to_string();
    }
    let cents = (price.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Joins a `YYYY-MM-DD` date and an `HH:MM[:SS]` time
pub fn combine_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = time.trim();
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .ok()?;
    Some(date.and_time(time))
}
