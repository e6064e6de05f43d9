//! Seeds a demo admin user and a couple of upcoming events.
//!
//! Safe to re-run: does nothing when the demo admin already exists.

use chrono::{TimeZone, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, Database, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

use tikiti_api_schema::{events, users};
use tikiti_core::tracing::init_tracing;

const ADMIN_EMAIL: &str = "admin@tikiti.example.com";

#[tokio::main]
async fn main() {
    init_tracing();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
    let db = Database::connect(&database_url)
        .await
        .expect("failed to connect to database");

    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(ADMIN_EMAIL))
        .one(&db)
        .await
        .expect("failed to query users");
    if existing.is_some() {
        info!("seed data already present, nothing to do");
        return;
    }

    let now = Utc::now();
    let admin_id = Uuid::now_v7();
    users::ActiveModel {
        id: Set(admin_id),
        external_id: Set("seed_admin".to_owned()),
        email: Set(ADMIN_EMAIL.to_owned()),
        name: Set("Demo Admin".to_owned()),
        role: Set("ADMIN".to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await
    .expect("failed to insert admin user");

    let demo_events = [
        (
            "Tech Conference 2024",
            "Join us for an amazing tech conference with industry leaders.",
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            "Tech Hub, Nairobi",
            5000_i64,
            100,
        ),
        (
            "Music Festival",
            "A day filled with live music performances and entertainment.",
            Utc.with_ymd_and_hms(2024, 4, 20, 12, 0, 0).unwrap(),
            "Freedom Park, Nairobi",
            3000_i64,
            200,
        ),
    ];

    for (title, description, date, venue, price, available_tickets) in demo_events {
        events::ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(title.to_owned()),
            description: Set(description.to_owned()),
            date: Set(date),
            venue: Set(venue.to_owned()),
            price: Set(price),
            available_tickets: Set(available_tickets),
            image_url: Set(None),
            created_by: Set(admin_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await
        .expect("failed to insert event");
        info!("seeded event {title}");
    }

    info!("database seeded");
}
