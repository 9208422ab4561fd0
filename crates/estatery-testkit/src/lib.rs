// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use estatery_app::{
    AgentStatus, Client, ClientStatus, DealType, DiscountStatus, InstallmentStatus, LeadSource,
    LeadStage, NewAgent, NewClient, NewDiscount, NewInstallment, NewLead, NewPayment,
    NewTransaction, PaymentStatus, PaymentType, Record, RecordStore, RowId, TransactionStatus,
};
use std::path::PathBuf;
use time::{Date, Month};

const FIRST_NAMES: [&str; 16] = [
    "Ama", "Kofi", "Linda", "James", "Abena", "Yaw", "Sarah", "Kwame", "Efua", "Robert", "Akosua",
    "Michael", "Esi", "Kojo", "Jessica", "Adjoa",
];
const LAST_NAMES: [&str; 14] = [
    "Mensah", "Owusu", "Boateng", "Asante", "Johnson", "Smith", "Addo", "Brown", "Osei",
    "Wilson", "Appiah", "Taylor", "Danso", "Lee",
];

const PROPERTY_NAMES: [&str; 12] = [
    "Pine View Apartments",
    "Cedar Park",
    "Sunnydale Residences",
    "Lakeside Manor",
    "Hilltop Suites",
    "Riverbend Apartments",
    "Oak Grove Estates",
    "Murphy House",
    "Seaside Retreat",
    "Palm Court",
    "Airport Hills Villa",
    "East Legon Heights",
];
const STREET_NAMES: [&str; 10] = [
    "Maple", "Oak", "Birch", "Willow", "Pine", "River", "Elm", "Evergreen", "Coastline", "Cedar",
];
const STREET_KINDS: [&str; 5] = ["St", "Ave", "Blvd", "Rd", "Dr"];
const CITIES: [&str; 5] = ["Springfield", "Accra", "Kumasi", "Tema", "Takoradi"];

const PROMO_WORDS: [&str; 8] = [
    "Summer", "Holiday", "Early Bird", "Referral", "Loyalty", "Weekend", "Student", "Flash",
];

const PLAN_STEPS: [&str; 6] = [
    "Deposit",
    "1st Payment",
    "2nd Payment",
    "3rd Payment",
    "4th Payment",
    "Final Payment",
];

/// Fixed-size client scenario used across crates: seven On Going, one
/// Completed, one Overdue, with "David Martinez" among the On Going rows.
pub const FIXTURE_CLIENT_STATUSES: [ClientStatus; 9] = [
    ClientStatus::OnGoing,
    ClientStatus::OnGoing,
    ClientStatus::OnGoing,
    ClientStatus::OnGoing,
    ClientStatus::OnGoing,
    ClientStatus::OnGoing,
    ClientStatus::OnGoing,
    ClientStatus::Completed,
    ClientStatus::Overdue,
];

pub const FIXTURE_DAVID_INDEX: usize = 6;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for console rows. Same seed, same rows.
#[derive(Debug, Clone)]
pub struct ConsoleFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl ConsoleFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn person_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    pub fn address(&mut self) -> String {
        format!(
            "{} {} {}, {}",
            self.int_range(100, 999),
            self.pick(&STREET_NAMES),
            self.pick(&STREET_KINDS),
            self.pick(&CITIES),
        )
    }

    pub fn client(&mut self) -> NewClient {
        let deal = if self.rng.bool() {
            DealType::Rent
        } else {
            DealType::Buy
        };
        NewClient {
            client_number: self.int_range(32_000, 32_999).to_string(),
            name: self.person_name(),
            property_name: self.pick(&PROPERTY_NAMES).to_owned(),
            property_address: self.address(),
            deal,
            amount_cents: self.int_range(200, 2_000) * 100,
            next_payment: self.date_in_year(2025),
            status: self.pick_label(ClientStatus::ALL),
        }
    }

    pub fn payment(&mut self) -> NewPayment {
        NewPayment {
            date: self.date_in_year(2025),
            property: self.pick(&PROPERTY_NAMES).to_owned(),
            address: self.address(),
            customer: self.person_name(),
            kind: self.pick_label(PaymentType::ALL),
            amount_cents: self.int_range(50_000, 5_000_000),
            status: self.pick_label(PaymentStatus::ALL),
        }
    }

    pub fn transaction(&mut self) -> NewTransaction {
        NewTransaction {
            date: self.date_in_year(2025),
            property: self.pick(&PROPERTY_NAMES).to_owned(),
            address: self.address(),
            customer: self.person_name(),
            kind: self.pick_label(PaymentType::ALL),
            amount_cents: self.int_range(50_000, 5_000_000),
            status: self.pick_label(TransactionStatus::ALL),
        }
    }

    pub fn lead(&mut self) -> NewLead {
        let name = self.person_name();
        NewLead {
            email: email_for(&name, "mail.test"),
            name,
            property_ref: self.pick(&PROPERTY_NAMES).to_owned(),
            source: self.pick_label(LeadSource::ALL),
            budget: format!("${},000", self.int_range(1, 900)),
            stage: self.pick_label(LeadStage::ALL),
            created_at: self.date_in_year(2025),
        }
    }

    pub fn discount(&mut self) -> NewDiscount {
        let start_date = self.date_in_year(2025);
        let end_date = start_date
            .checked_add(time::Duration::days(self.int_range(7, 90)))
            .unwrap_or(start_date);
        let word = self.pick(&PROMO_WORDS);
        let percentage = self.int_range(1, 10) * 5;
        NewDiscount {
            name: format!("{word} Discount"),
            code: format!(
                "{}{percentage}",
                word.replace(' ', "").to_ascii_uppercase()
            ),
            percentage,
            properties_count: self.int_range(1, 20),
            start_date,
            end_date,
            status: self.pick_label(DiscountStatus::ALL),
        }
    }

    pub fn agent(&mut self) -> NewAgent {
        let name = self.person_name();
        let phone = self.rng.bool().then(|| {
            format!(
                "+233 {} {:03} {:04}",
                20 + self.int_range(0, 9),
                self.int_range(0, 999),
                self.int_range(0, 9999)
            )
        });
        NewAgent {
            email: email_for(&name, "estatery.test"),
            name,
            phone,
            properties: self.int_range(0, 40),
            deals_closed: self.int_range(0, 120),
            rating: self.int_range(30, 50) as f64 / 10.0,
            status: self.pick_label(AgentStatus::ALL),
        }
    }

    /// Belongs to one of `C-1001`..`C-1009`, the ids of [`fixture_clients`].
    pub fn installment(&mut self) -> NewInstallment {
        NewInstallment {
            client_id: RowId::new(format!("C-{}", self.int_range(1001, 1009))),
            label: self.pick(&PLAN_STEPS).to_owned(),
            due_date: self.date_in_year(2025),
            amount_cents: self.int_range(10_000, 100_000),
            status: self.pick_label(InstallmentStatus::ALL),
        }
    }

    pub fn date_in_year(&mut self, year: i32) -> Date {
        let month = Month::try_from(self.int_range(1, 12) as u8).unwrap_or(Month::January);
        let day = self.int_range(1, 28) as u8;
        Date::from_calendar_date(year, month, day).unwrap_or(Date::MIN)
    }

    /// `count` generated rows inserted into an otherwise empty store.
    pub fn store_of<R, F>(&mut self, count: usize, mut generate: F) -> RecordStore<R>
    where
        R: Record,
        F: FnMut(&mut Self) -> R::New,
    {
        let rows = (0..count).map(|_| generate(self)).collect();
        let mut store = RecordStore::empty();
        store.insert_batch(rows);
        store
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn pick_label<L: Copy>(&mut self, items: &[L]) -> L {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

fn email_for(name: &str, domain: &str) -> String {
    format!("{}@{domain}", name.to_lowercase().replace(' ', "."))
}

/// Nine clients in dataset order with ids `C-1001`..`C-1009`.
pub fn fixture_clients() -> Vec<Client> {
    let mut faker = ConsoleFaker::new(9);
    let rows = FIXTURE_CLIENT_STATUSES
        .iter()
        .enumerate()
        .map(|(index, status)| {
            let mut new = faker.client();
            new.status = *status;
            // Generated names never contain "dav".
            if index == FIXTURE_DAVID_INDEX {
                new.name = "David Martinez".to_owned();
            }
            new
        })
        .collect();
    let mut store = RecordStore::<Client>::empty();
    store.insert_batch(rows);
    store.list().to_vec()
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("estatery.db");
    Ok((dir, db_path))
}
