use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use tern_core::model::FlightFilter;
use tern_core::store::{RebindStatus, ReleaseStatus, StoreError, TravelStore};
use tern_store::SqliteTravelStore;

fn zone() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).unwrap()
}

fn ts(datetime: DateTime<FixedOffset>) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S%.6f%:z").to_string()
}

fn june(day: u32, hour: u32) -> DateTime<FixedOffset> {
    zone().with_ymd_and_hms(2030, 6, day, hour, 0, 0).unwrap()
}

async fn fixture_pool() -> Pool<Sqlite> {
    // Single connection so every query sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::raw_sql(
        "CREATE TABLE flights (
            flight_id INTEGER PRIMARY KEY,
            flight_no TEXT NOT NULL,
            departure_airport TEXT NOT NULL,
            arrival_airport TEXT NOT NULL,
            scheduled_departure TEXT NOT NULL,
            scheduled_arrival TEXT NOT NULL
        );
        CREATE TABLE tickets (
            ticket_no TEXT PRIMARY KEY,
            book_ref TEXT NOT NULL,
            passenger_id TEXT NOT NULL
        );
        CREATE TABLE ticket_flights (
            ticket_no TEXT PRIMARY KEY,
            flight_id INTEGER NOT NULL,
            fare_conditions TEXT NOT NULL
        );
        CREATE TABLE boarding_passes (
            ticket_no TEXT NOT NULL,
            flight_id INTEGER NOT NULL,
            seat_no TEXT NOT NULL
        );",
    )
    .execute(&pool)
    .await
    .unwrap();

    for (id, no, dep, arr, sd, sa) in [
        (1, "TN0001", "JFK", "LHR", june(1, 10), june(1, 17)),
        (2, "TN0002", "JFK", "LHR", june(1, 15), june(1, 22)),
        (3, "TN0003", "JFK", "CDG", june(2, 9), june(2, 16)),
        (4, "TN0004", "BOS", "LHR", june(1, 12), june(1, 19)),
        (5, "TN0005", "JFK", "LHR", june(3, 8), june(3, 15)),
    ] {
        sqlx::query(
            "INSERT INTO flights (flight_id, flight_no, departure_airport, arrival_airport, \
             scheduled_departure, scheduled_arrival) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id as i64)
        .bind(no)
        .bind(dep)
        .bind(arr)
        .bind(ts(sd))
        .bind(ts(sa))
        .execute(&pool)
        .await
        .unwrap();
    }

    for (ticket_no, book_ref, passenger_id) in [
        ("T1", "BR001", "P1"),
        ("T2", "BR002", "P1"),
        ("T3", "BR003", "P2"),
    ] {
        sqlx::query("INSERT INTO tickets (ticket_no, book_ref, passenger_id) VALUES (?, ?, ?)")
            .bind(ticket_no)
            .bind(book_ref)
            .bind(passenger_id)
            .execute(&pool)
            .await
            .unwrap();
    }

    for (ticket_no, flight_id, fare) in [("T1", 1, "Economy"), ("T2", 3, "Business"), ("T3", 1, "Economy")] {
        sqlx::query(
            "INSERT INTO ticket_flights (ticket_no, flight_id, fare_conditions) VALUES (?, ?, ?)",
        )
        .bind(ticket_no)
        .bind(flight_id as i64)
        .bind(fare)
        .execute(&pool)
        .await
        .unwrap();
    }

    for (ticket_no, flight_id, seat) in [("T1", 1, "12A"), ("T2", 3, "2C"), ("T3", 1, "14F")] {
        sqlx::query("INSERT INTO boarding_passes (ticket_no, flight_id, seat_no) VALUES (?, ?, ?)")
            .bind(ticket_no)
            .bind(flight_id as i64)
            .bind(seat)
            .execute(&pool)
            .await
            .unwrap();
    }

    pool
}

#[tokio::test]
async fn test_itinerary_returns_only_the_passengers_tickets() {
    let pool = fixture_pool().await;
    let store = SqliteTravelStore::new(pool);

    let rows = store.itinerary("P1").await.unwrap();

    assert_eq!(rows.len(), 2);
    let t1 = rows.iter().find(|r| r.ticket_no == "T1").unwrap();
    assert_eq!(t1.book_ref, "BR001");
    assert_eq!(t1.flight_no, "TN0001");
    assert_eq!(t1.seat_no, "12A");
    assert_eq!(t1.fare_conditions, "Economy");
    assert_eq!(t1.scheduled_departure, june(1, 10));
    assert!(rows.iter().all(|r| r.ticket_no != "T3"));

    let none = store.itinerary("P9").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_search_filters_are_conjunctive_and_bounds_inclusive() {
    let pool = fixture_pool().await;
    let store = SqliteTravelStore::new(pool);

    let filter = FlightFilter {
        departure_airport: Some("JFK".to_string()),
        start_time: Some(june(1, 10)),
        end_time: Some(june(2, 9)),
        limit: 5,
        ..FlightFilter::default()
    };
    let flights = store.search_flights(&filter).await.unwrap();

    // Flights 1, 2 and 3 depart JFK inside [D1, D2]; both bounds land
    // exactly on a departure and must still match.
    let mut ids: Vec<i64> = flights.iter().map(|f| f.flight_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(flights.iter().all(|f| f.departure_airport == "JFK"));
}

#[tokio::test]
async fn test_search_without_filters_is_capped_by_limit() {
    let pool = fixture_pool().await;
    let store = SqliteTravelStore::new(pool);

    let all = store.search_flights(&FlightFilter::default()).await.unwrap();
    assert_eq!(all.len(), 5);

    let capped = store
        .search_flights(&FlightFilter {
            limit: 2,
            ..FlightFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(capped.len(), 2);
}

#[tokio::test]
async fn test_find_flight_and_current_binding() {
    let pool = fixture_pool().await;
    let store = SqliteTravelStore::new(pool);

    let flight = store.find_flight(2).await.unwrap().unwrap();
    assert_eq!(flight.flight_no, "TN0002");
    assert_eq!(flight.scheduled_departure, june(1, 15));
    assert!(store.find_flight(99).await.unwrap().is_none());

    let binding = store.current_binding("T1").await.unwrap().unwrap();
    assert_eq!(binding.flight_id, 1);
    assert_eq!(binding.fare_conditions, "Economy");
    assert!(store.current_binding("T9").await.unwrap().is_none());
}

#[tokio::test]
async fn test_rebind_applies_atomically_for_the_owner() {
    let pool = fixture_pool().await;
    let store = SqliteTravelStore::new(pool);

    let status = store.rebind_ticket("T1", "P1", 2).await.unwrap();
    assert_eq!(status, RebindStatus::Applied);

    let binding = store.current_binding("T1").await.unwrap().unwrap();
    assert_eq!(binding.flight_id, 2);
}

#[tokio::test]
async fn test_rebind_rejects_non_owner_without_mutating() {
    let pool = fixture_pool().await;
    let store = SqliteTravelStore::new(pool);

    let status = store.rebind_ticket("T1", "P2", 2).await.unwrap();
    assert_eq!(status, RebindStatus::OwnershipMismatch);

    let binding = store.current_binding("T1").await.unwrap().unwrap();
    assert_eq!(binding.flight_id, 1);
}

#[tokio::test]
async fn test_rebind_detects_vanished_flight_and_binding() {
    let pool = fixture_pool().await;
    let store = SqliteTravelStore::new(pool);

    assert_eq!(
        store.rebind_ticket("T1", "P1", 99).await.unwrap(),
        RebindStatus::FlightGone
    );
    assert_eq!(
        store.rebind_ticket("T9", "P1", 2).await.unwrap(),
        RebindStatus::BindingGone
    );
}

#[tokio::test]
async fn test_release_removes_binding_but_keeps_ticket_and_passes() {
    let pool = fixture_pool().await;
    let store = SqliteTravelStore::new(pool.clone());

    let status = store.release_ticket("T1", "P1").await.unwrap();
    assert_eq!(status, ReleaseStatus::Released);
    assert!(store.current_binding("T1").await.unwrap().is_none());

    // Historical record survives cancellation.
    let (tickets,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM tickets WHERE ticket_no = 'T1'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(tickets, 1);
    let (passes,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM boarding_passes WHERE ticket_no = 'T1'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(passes, 1);
}

#[tokio::test]
async fn test_release_rejects_non_owner() {
    let pool = fixture_pool().await;
    let store = SqliteTravelStore::new(pool);

    let status = store.release_ticket("T1", "P2").await.unwrap();
    assert_eq!(status, ReleaseStatus::OwnershipMismatch);
    assert!(store.current_binding("T1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_malformed_stored_timestamp_is_a_fault() {
    let pool = fixture_pool().await;
    sqlx::query("UPDATE flights SET scheduled_departure = 'garbage' WHERE flight_id = 1")
        .execute(&pool)
        .await
        .unwrap();
    let store = SqliteTravelStore::new(pool);

    let err = store.find_flight(1).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::MalformedTimestamp { flight_id: 1, .. }
    ));
}
