//! Demo data loaded when `store.seed_defaults` is enabled.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::{Order, OrderStatus, ResolvedTicket, Status, StoreSnapshot, Ticket, TicketDetails};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("seed dates are valid")
}

fn instant(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("seed instants are valid")
}

fn details(fields: [&str; 8]) -> TicketDetails {
    let [product, device_model, issue, pickup_date, time_slot, address, contact_number, notes] =
        fields;
    TicketDetails {
        product: product.to_string(),
        device_model: device_model.to_string(),
        issue: issue.to_string(),
        pickup_date: pickup_date.to_string(),
        time_slot: time_slot.to_string(),
        address: address.to_string(),
        contact_number: contact_number.to_string(),
        notes: notes.to_string(),
    }
}

/// Two active tickets, two resolved tickets and three orders.
pub fn default_snapshot() -> StoreSnapshot {
    let tickets = vec![
        Ticket::new(
            "TKT-1234",
            details([
                "laptop",
                "ThinkPad X1 Carbon",
                "Screen flickering intermittently",
                "2025-10-25",
                "10:00 AM - 12:00 PM",
                "123 Main Street, Apt 4B",
                "+1 (555) 123-4567",
                "Please call before pickup",
            ]),
            Status::InService,
            instant(2025, 10, 20, 10, 30),
        ),
        Ticket::new(
            "TKT-1235",
            details([
                "mobile",
                "Galaxy S24",
                "Charging port loose",
                "2025-10-28",
                "2:00 PM - 4:00 PM",
                "456 Oak Avenue",
                "+1 (555) 987-6543",
                "Gate code: 1234",
            ]),
            Status::Picked,
            instant(2025, 10, 22, 14, 15),
        ),
    ];

    let resolved_tickets = vec![
        ResolvedTicket {
            id: "TKT-1150".to_string(),
            product: "Laptop - Standard".to_string(),
            issue: "Battery draining fast".to_string(),
            resolution: "Battery replaced with new unit. Calibration performed. Issue resolved."
                .to_string(),
            resolved_by: "Mike R.".to_string(),
            resolved_date: date(2025, 9, 15),
        },
        ResolvedTicket {
            id: "TKT-1089".to_string(),
            product: "TV - Premium".to_string(),
            issue: "HDMI port not working".to_string(),
            resolution: "HDMI board replaced. All ports tested and functioning correctly."
                .to_string(),
            resolved_by: "Emily K.".to_string(),
            resolved_date: date(2025, 7, 22),
        },
    ];

    let orders = vec![
        Order {
            id: "P-1001".to_string(),
            product: "Mobile - Premium (Galaxy S24)".to_string(),
            order_date: date(2025, 8, 15),
            service_tier: "Gold".to_string(),
            status: OrderStatus::Active,
        },
        Order {
            id: "P-0987".to_string(),
            product: "TV - Premium (OLED 65\")".to_string(),
            order_date: date(2025, 3, 22),
            service_tier: "Gold".to_string(),
            status: OrderStatus::Active,
        },
        Order {
            id: "P-0856".to_string(),
            product: "Laptop - Standard (ThinkBook 15)".to_string(),
            order_date: date(2023, 11, 10),
            service_tier: "Medium".to_string(),
            status: OrderStatus::Expired,
        },
    ];

    StoreSnapshot {
        tickets,
        resolved_tickets,
        orders,
    }
}
