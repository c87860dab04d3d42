use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Scheduled flight reference data. Immutable once scheduled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flight {
    pub flight_id: i64,
    pub flight_no: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub scheduled_departure: DateTime<FixedOffset>,
    pub scheduled_arrival: DateTime<FixedOffset>,
}

/// The current flight binding of a ticket. Exactly one row per ticket;
/// this is the unit rebooking mutates and cancellation removes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketFlight {
    pub ticket_no: String,
    pub flight_id: i64,
    pub fare_conditions: String,
}

/// One row of a passenger's itinerary: ticket, bound flight, seat, fare.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryRow {
    pub ticket_no: String,
    pub book_ref: String,
    pub flight_id: i64,
    pub flight_no: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub scheduled_departure: DateTime<FixedOffset>,
    pub scheduled_arrival: DateTime<FixedOffset>,
    pub seat_no: String,
    pub fare_conditions: String,
}

/// Optional, AND-combined flight search criteria. Time bounds are inclusive
/// on the scheduled departure.
#[derive(Debug, Clone, Deserialize)]
pub struct FlightFilter {
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

impl Default for FlightFilter {
    fn default() -> Self {
        Self {
            departure_airport: None,
            arrival_airport: None,
            start_time: None,
            end_time: None,
            limit: default_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults_to_limit_20() {
        let filter = FlightFilter::default();
        assert!(filter.departure_airport.is_none());
        assert_eq!(filter.limit, 20);
    }

    #[test]
    fn test_filter_deserialization_fills_limit() {
        let json = r#"{ "departure_airport": "JFK" }"#;
        let filter: FlightFilter = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(filter.departure_airport.as_deref(), Some("JFK"));
        assert_eq!(filter.limit, 20);
    }
}
