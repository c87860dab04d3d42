use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sqlx::sqlite::Sqlite;
use sqlx::{FromRow, Pool, QueryBuilder};
use tracing::debug;

use tern_core::model::{Flight, FlightFilter, ItineraryRow, TicketFlight};
use tern_core::store::{RebindStatus, ReleaseStatus, StoreError, TravelStore};

/// On-disk timestamp format of the travel database
/// (e.g. `2030-06-01 10:00:00.000000+03:00`).
const STORED_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%z";

/// Format used when binding time bounds; SQLite's `datetime()` normalizes
/// both sides to UTC so flights stored with different offsets compare
/// correctly.
const BOUND_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f%:z";

pub struct SqliteTravelStore {
    pool: Pool<Sqlite>,
}

impl SqliteTravelStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct FlightRow {
    flight_id: i64,
    flight_no: String,
    departure_airport: String,
    arrival_airport: String,
    scheduled_departure: String,
    scheduled_arrival: String,
}

impl FlightRow {
    fn into_flight(self) -> Result<Flight, StoreError> {
        Ok(Flight {
            scheduled_departure: parse_stored_ts(self.flight_id, &self.scheduled_departure)?,
            scheduled_arrival: parse_stored_ts(self.flight_id, &self.scheduled_arrival)?,
            flight_id: self.flight_id,
            flight_no: self.flight_no,
            departure_airport: self.departure_airport,
            arrival_airport: self.arrival_airport,
        })
    }
}

#[derive(FromRow)]
struct ItineraryRowRaw {
    ticket_no: String,
    book_ref: String,
    flight_id: i64,
    flight_no: String,
    departure_airport: String,
    arrival_airport: String,
    scheduled_departure: String,
    scheduled_arrival: String,
    seat_no: String,
    fare_conditions: String,
}

impl ItineraryRowRaw {
    fn into_row(self) -> Result<ItineraryRow, StoreError> {
        Ok(ItineraryRow {
            scheduled_departure: parse_stored_ts(self.flight_id, &self.scheduled_departure)?,
            scheduled_arrival: parse_stored_ts(self.flight_id, &self.scheduled_arrival)?,
            ticket_no: self.ticket_no,
            book_ref: self.book_ref,
            flight_id: self.flight_id,
            flight_no: self.flight_no,
            departure_airport: self.departure_airport,
            arrival_airport: self.arrival_airport,
            seat_no: self.seat_no,
            fare_conditions: self.fare_conditions,
        })
    }
}

/// A timestamp the database holds in an unexpected shape is an
/// infrastructure fault, never silently coerced.
fn parse_stored_ts(flight_id: i64, value: &str) -> Result<DateTime<FixedOffset>, StoreError> {
    DateTime::parse_from_str(value, STORED_TS_FORMAT).map_err(|_| StoreError::MalformedTimestamp {
        flight_id,
        value: value.to_string(),
    })
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl TravelStore for SqliteTravelStore {
    async fn find_flight(&self, flight_id: i64) -> Result<Option<Flight>, StoreError> {
        let row: Option<FlightRow> = sqlx::query_as(
            "SELECT flight_id, flight_no, departure_airport, arrival_airport, \
                    scheduled_departure, scheduled_arrival \
             FROM flights WHERE flight_id = ?",
        )
        .bind(flight_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(FlightRow::into_flight).transpose()
    }

    async fn current_binding(&self, ticket_no: &str) -> Result<Option<TicketFlight>, StoreError> {
        let row: Option<(String, i64, String)> = sqlx::query_as(
            "SELECT ticket_no, flight_id, fare_conditions FROM ticket_flights WHERE ticket_no = ?",
        )
        .bind(ticket_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(|(ticket_no, flight_id, fare_conditions)| TicketFlight {
            ticket_no,
            flight_id,
            fare_conditions,
        }))
    }

    async fn is_ticket_owner(
        &self,
        ticket_no: &str,
        passenger_id: &str,
    ) -> Result<bool, StoreError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM tickets WHERE ticket_no = ? AND passenger_id = ?")
                .bind(ticket_no)
                .bind(passenger_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

        Ok(row.is_some())
    }

    async fn itinerary(&self, passenger_id: &str) -> Result<Vec<ItineraryRow>, StoreError> {
        let rows: Vec<ItineraryRowRaw> = sqlx::query_as(
            "SELECT t.ticket_no, \
                    t.book_ref, \
                    f.flight_id, \
                    f.flight_no, \
                    f.departure_airport, \
                    f.arrival_airport, \
                    f.scheduled_departure, \
                    f.scheduled_arrival, \
                    bp.seat_no, \
                    tf.fare_conditions \
             FROM tickets t \
                      JOIN ticket_flights tf ON t.ticket_no = tf.ticket_no \
                      JOIN flights f ON tf.flight_id = f.flight_id \
                      JOIN boarding_passes bp ON bp.ticket_no = t.ticket_no AND bp.flight_id = f.flight_id \
             WHERE t.passenger_id = ?",
        )
        .bind(passenger_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(ItineraryRowRaw::into_row).collect()
    }

    async fn search_flights(&self, filter: &FlightFilter) -> Result<Vec<Flight>, StoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT flight_id, flight_no, departure_airport, arrival_airport, \
                    scheduled_departure, scheduled_arrival \
             FROM flights WHERE 1 = 1",
        );

        if let Some(dep) = &filter.departure_airport {
            qb.push(" AND departure_airport = ").push_bind(dep.clone());
        }
        if let Some(arr) = &filter.arrival_airport {
            qb.push(" AND arrival_airport = ").push_bind(arr.clone());
        }
        if let Some(start) = &filter.start_time {
            qb.push(" AND datetime(scheduled_departure) >= datetime(")
                .push_bind(start.format(BOUND_TS_FORMAT).to_string())
                .push(")");
        }
        if let Some(end) = &filter.end_time {
            qb.push(" AND datetime(scheduled_departure) <= datetime(")
                .push_bind(end.format(BOUND_TS_FORMAT).to_string())
                .push(")");
        }
        qb.push(" LIMIT ").push_bind(filter.limit);

        debug!(limit = filter.limit, "searching flights");
        let rows: Vec<FlightRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.into_iter().map(FlightRow::into_flight).collect()
    }

    async fn rebind_ticket(
        &self,
        ticket_no: &str,
        passenger_id: &str,
        new_flight_id: i64,
    ) -> Result<RebindStatus, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let flight: Option<(i64,)> =
            sqlx::query_as("SELECT flight_id FROM flights WHERE flight_id = ?")
                .bind(new_flight_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;
        if flight.is_none() {
            return Ok(RebindStatus::FlightGone);
        }

        let binding: Option<(i64,)> =
            sqlx::query_as("SELECT flight_id FROM ticket_flights WHERE ticket_no = ?")
                .bind(ticket_no)
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;
        if binding.is_none() {
            return Ok(RebindStatus::BindingGone);
        }

        let owner: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM tickets WHERE ticket_no = ? AND passenger_id = ?")
                .bind(ticket_no)
                .bind(passenger_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;
        if owner.is_none() {
            return Ok(RebindStatus::OwnershipMismatch);
        }

        sqlx::query("UPDATE ticket_flights SET flight_id = ? WHERE ticket_no = ?")
            .bind(new_flight_id)
            .bind(ticket_no)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(RebindStatus::Applied)
    }

    async fn release_ticket(
        &self,
        ticket_no: &str,
        passenger_id: &str,
    ) -> Result<ReleaseStatus, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let binding: Option<(i64,)> =
            sqlx::query_as("SELECT flight_id FROM ticket_flights WHERE ticket_no = ?")
                .bind(ticket_no)
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;
        if binding.is_none() {
            return Ok(ReleaseStatus::BindingGone);
        }

        let owner: Option<(String,)> =
            sqlx::query_as("SELECT ticket_no FROM tickets WHERE ticket_no = ? AND passenger_id = ?")
                .bind(ticket_no)
                .bind(passenger_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;
        if owner.is_none() {
            return Ok(ReleaseStatus::OwnershipMismatch);
        }

        sqlx::query("DELETE FROM ticket_flights WHERE ticket_no = ?")
            .bind(ticket_no)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(ReleaseStatus::Released)
    }
}
