// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use estatery_app::{
    Agent, AgentStatus, Client, ClientStatus, DealType, Discount, DiscountStatus, Installment,
    InstallmentStatus, Lead, LeadSource, LeadStage, NewAgent, NewClient, NewDiscount,
    NewInstallment, NewLead, NewPayment, NewTransaction, Payment, PaymentStatus, PaymentType,
    RowId, Transaction, TransactionStatus,
};
use time::Date;
use time::macros::date;

use crate::Store;

impl Store {
    /// Replaces every dataset with the console's demo rows.
    pub fn seed_demo_data(&mut self) -> Result<()> {
        self.replace_rows(&demo_clients())?;
        self.replace_rows(&demo_payments())?;
        self.replace_rows(&demo_transactions())?;
        self.replace_rows(&demo_leads())?;
        self.replace_rows(&demo_discounts())?;
        self.replace_rows(&demo_agents())?;
        self.replace_rows(&demo_installments(&demo_clients()))?;
        tracing::info!("seeded demo data");
        Ok(())
    }
}

type ClientSeed = (&'static str, &'static str, &'static str, &'static str, i64, Date, ClientStatus);

const CLIENTS: &[ClientSeed] = &[
    ("32484", "James Smith", "Pine View Apartments", "123 Maple St, Springfield, USA", 1800, date!(2025 - 07 - 15), ClientStatus::OnGoing),
    ("32485", "Linda Johnson", "Cedar Park", "456 Oak Ave, Springfield, USA", 950, date!(2025 - 08 - 05), ClientStatus::OnGoing),
    ("32486", "Robert Brown", "Sunnydale Residences", "789 Birch Blvd, Springfield, USA", 1200, date!(2025 - 09 - 01), ClientStatus::OnGoing),
    ("32487", "Jessica Wilson", "Lakeside Manor", "321 Willow Way, Springfield, USA", 1450, date!(2025 - 10 - 10), ClientStatus::OnGoing),
    ("32488", "Michael Taylor", "Hilltop Suites", "654 Pine St, Springfield, USA", 1350, date!(2025 - 11 - 20), ClientStatus::OnGoing),
    ("32489", "Sara Davis", "Riverbend Apartments", "987 River Rd, Springfield, USA", 1100, date!(2025 - 12 - 30), ClientStatus::OnGoing),
    ("32490", "David Martinez", "Oak Grove Estates", "159 Elm St, Springfield, USA", 1300, date!(2026 - 01 - 05), ClientStatus::OnGoing),
    ("32483", "Amanda Lee", "Murphy House", "742 Evergreen Terrace, Springfield, USA", 213, date!(2025 - 06 - 21), ClientStatus::Completed),
    ("32491", "Karen Hernandez", "Seaside Retreat", "258 Coastline Dr, Springfield, USA", 1700, date!(2026 - 02 - 14), ClientStatus::Overdue),
];

/// Nine clients: seven on going, one completed, one overdue.
pub fn demo_clients() -> Vec<Client> {
    CLIENTS
        .iter()
        .enumerate()
        .map(|(index, (number, name, property, address, amount, next, status))| {
            Client::from_new(
                RowId::new(format!("C-{}", 1001 + index)),
                NewClient {
                    client_number: (*number).to_owned(),
                    name: (*name).to_owned(),
                    property_name: (*property).to_owned(),
                    property_address: (*address).to_owned(),
                    deal: DealType::Rent,
                    amount_cents: amount * 100,
                    next_payment: *next,
                    status: *status,
                },
            )
        })
        .collect()
}

type LedgerSeed<S> = (u32, Date, &'static str, &'static str, &'static str, PaymentType, i64, S);

const PAYMENTS: &[LedgerSeed<PaymentStatus>] = &[
    (23487, date!(2025 - 07 - 08), "Oak Grove Estates", "123 Oak St", "David Martinez", PaymentType::Rent, 29_300, PaymentStatus::Pending),
    (23488, date!(2025 - 07 - 09), "Maple Heights", "456 Maple Ave", "Sarah Johnson", PaymentType::Rent, 32_000, PaymentStatus::Failed),
    (23489, date!(2025 - 07 - 10), "Pine View", "789 Pine Rd", "Mike Chen", PaymentType::Sale, 1_520_000, PaymentStatus::Completed),
    (23490, date!(2025 - 07 - 11), "Sunset Terrace", "321 Sunset Blvd", "Emma Wilson", PaymentType::Rent, 45_000, PaymentStatus::Pending),
    (23491, date!(2025 - 07 - 12), "Lakeside Villa", "555 Lake Dr", "James Brown", PaymentType::Sale, 850_000, PaymentStatus::Completed),
    (23492, date!(2025 - 07 - 13), "Urban Heights", "100 Main St", "Anna Davis", PaymentType::Rent, 38_000, PaymentStatus::Pending),
    (23493, date!(2025 - 07 - 14), "Green Valley", "200 Valley Rd", "Chris Lee", PaymentType::Rent, 52_000, PaymentStatus::Completed),
    (23494, date!(2025 - 07 - 15), "Harbor View", "77 Harbor St", "Maria Garcia", PaymentType::Sale, 1_200_000, PaymentStatus::Failed),
    (23495, date!(2025 - 07 - 16), "Park Place", "88 Park Ave", "Tom Anderson", PaymentType::Rent, 61_000, PaymentStatus::Pending),
    (23496, date!(2025 - 07 - 17), "Riverside", "33 River Ln", "Lisa Moore", PaymentType::Rent, 29_500, PaymentStatus::Completed),
    (23497, date!(2025 - 07 - 18), "Hilltop Manor", "99 Hill Rd", "Paul Clark", PaymentType::Sale, 920_000, PaymentStatus::Pending),
    (23498, date!(2025 - 07 - 19), "Downtown Loft", "44 Center St", "Rachel Green", PaymentType::Rent, 72_000, PaymentStatus::Completed),
];

pub fn demo_payments() -> Vec<Payment> {
    PAYMENTS
        .iter()
        .map(|(number, date, property, address, customer, kind, amount, status)| {
            Payment::from_new(
                RowId::new(format!("P-{number}")),
                NewPayment {
                    date: *date,
                    property: (*property).to_owned(),
                    address: (*address).to_owned(),
                    customer: (*customer).to_owned(),
                    kind: *kind,
                    amount_cents: *amount,
                    status: *status,
                },
            )
        })
        .collect()
}

const TRANSACTIONS: &[LedgerSeed<TransactionStatus>] = &[
    (23487, date!(2025 - 07 - 08), "Oak Grove Estates", "159 Elm St, Springfield, USA", "David Martinez", PaymentType::Rent, 29_300, TransactionStatus::Success),
    (23488, date!(2025 - 07 - 09), "Maple Heights", "78 Maple Ave, Springfield, USA", "Sarah Johnson", PaymentType::Rent, 32_000, TransactionStatus::Success),
    (23489, date!(2025 - 07 - 10), "Riverbend Apartments", "42 River Rd, Springfield, USA", "Michael Smith", PaymentType::Rent, 27_500, TransactionStatus::Pending),
    (23490, date!(2025 - 07 - 11), "Sunset Terrace", "321 Sunset Blvd", "Emma Wilson", PaymentType::Rent, 45_000, TransactionStatus::Success),
    (23491, date!(2025 - 07 - 12), "Lakeside Villa", "555 Lake Dr", "James Brown", PaymentType::Sale, 850_000, TransactionStatus::Success),
    (23492, date!(2025 - 07 - 13), "Urban Heights", "100 Main St", "Anna Davis", PaymentType::Rent, 38_000, TransactionStatus::Pending),
    (23493, date!(2025 - 07 - 14), "Green Valley", "200 Valley Rd", "Chris Lee", PaymentType::Rent, 52_000, TransactionStatus::Success),
    (23494, date!(2025 - 07 - 15), "Harbor View", "77 Harbor St", "Maria Garcia", PaymentType::Sale, 1_200_000, TransactionStatus::Failed),
    (23495, date!(2025 - 07 - 16), "Park Place", "88 Park Ave", "Tom Anderson", PaymentType::Rent, 61_000, TransactionStatus::Pending),
    (23496, date!(2025 - 07 - 17), "Riverside", "33 River Ln", "Lisa Moore", PaymentType::Rent, 29_500, TransactionStatus::Success),
    (23497, date!(2025 - 07 - 18), "Hilltop Manor", "99 Hill Rd", "Paul Clark", PaymentType::Sale, 920_000, TransactionStatus::Pending),
    (23498, date!(2025 - 07 - 19), "Downtown Loft", "44 Center St", "Rachel Green", PaymentType::Rent, 72_000, TransactionStatus::Success),
    (23499, date!(2025 - 07 - 20), "Garden View", "12 Garden St", "Steve Adams", PaymentType::Rent, 41_000, TransactionStatus::Success),
];

pub fn demo_transactions() -> Vec<Transaction> {
    TRANSACTIONS
        .iter()
        .map(|(number, date, property, address, customer, kind, amount, status)| {
            Transaction::from_new(
                RowId::new(format!("T-{number}")),
                NewTransaction {
                    date: *date,
                    property: (*property).to_owned(),
                    address: (*address).to_owned(),
                    customer: (*customer).to_owned(),
                    kind: *kind,
                    amount_cents: *amount,
                    status: *status,
                },
            )
        })
        .collect()
}

pub fn demo_leads() -> Vec<Lead> {
    let seeds = [
        (3421, "James Smith", "03483", LeadSource::Website, "$600–$800 / month", LeadStage::New, date!(2025 - 07 - 10)),
        (3422, "Linda Johnson", "03484", LeadSource::Ads, "$1,000–$1,400 / month", LeadStage::Contacted, date!(2025 - 07 - 09)),
        (3423, "Robert Brown", "03485", LeadSource::Referral, "$2,000–$3,000 / month", LeadStage::TourScheduled, date!(2025 - 07 - 08)),
        (3424, "Jessica Wilson", "03486", LeadSource::Website, "$700–$900 / month", LeadStage::Negotiation, date!(2025 - 07 - 05)),
        (3425, "Michael Taylor", "03487", LeadSource::Referral, "$1,200–$1,800 / month", LeadStage::Closed, date!(2025 - 07 - 02)),
    ];
    seeds
        .into_iter()
        .map(|(number, name, property, source, budget, stage, created)| {
            Lead::from_new(
                RowId::new(format!("L-{number}")),
                NewLead {
                    name: name.to_owned(),
                    email: example_email(name),
                    property_ref: property.to_owned(),
                    source,
                    budget: budget.to_owned(),
                    stage,
                    created_at: created,
                },
            )
        })
        .collect()
}

pub fn demo_discounts() -> Vec<Discount> {
    let seeds = [
        (1021, "Summer Move-In", "SUMMER25", 25, 8, date!(2025 - 07 - 01), date!(2025 - 08 - 31), DiscountStatus::Active),
        (1022, "New Listing Promo", "NEWLIST10", 10, 5, date!(2025 - 08 - 01), date!(2025 - 09 - 01), DiscountStatus::Scheduled),
        (1019, "Spring Flash Sale", "SPRING15", 15, 12, date!(2025 - 04 - 01), date!(2025 - 04 - 30), DiscountStatus::Expired),
    ];
    seeds
        .into_iter()
        .map(|(number, name, code, percentage, properties, start, end, status)| {
            Discount::from_new(
                RowId::new(format!("D-{number}")),
                NewDiscount {
                    name: name.to_owned(),
                    code: code.to_owned(),
                    percentage,
                    properties_count: properties,
                    start_date: start,
                    end_date: end,
                    status,
                },
            )
        })
        .collect()
}

pub fn demo_agents() -> Vec<Agent> {
    let seeds = [
        (1021, "Sarah Lee", "+1 (555) 011-2345", 24, 18, 4.9, AgentStatus::Active),
        (1022, "Jonathan Cruz", "+1 (555) 016-7890", 15, 9, 4.6, AgentStatus::Pending),
        (1023, "Amanda Lee", "+1 (555) 018-9876", 12, 7, 4.4, AgentStatus::Active),
        (1024, "Robert Brown", "+1 (555) 017-4456", 4, 2, 4.1, AgentStatus::Inactive),
    ];
    seeds
        .into_iter()
        .map(|(number, name, phone, properties, deals, rating, status)| {
            Agent::from_new(
                RowId::new(format!("A-{number}")),
                NewAgent {
                    name: name.to_owned(),
                    email: example_email(name),
                    phone: Some(phone.to_owned()),
                    properties,
                    deals_closed: deals,
                    rating,
                    status,
                },
            )
        })
        .collect()
}

const PLAN: &[(&str, Date, i64, InstallmentStatus)] = &[
    ("Final Payment", date!(2025 - 07 - 28), 42_600, InstallmentStatus::Pending),
    ("4th Payment", date!(2025 - 07 - 23), 15_000, InstallmentStatus::Pending),
    ("3rd Payment", date!(2025 - 07 - 19), 73_250, InstallmentStatus::Pending),
    ("2nd Payment", date!(2025 - 07 - 10), 30_000, InstallmentStatus::Pending),
    ("1st Payment", date!(2025 - 06 - 30), 20_000, InstallmentStatus::Paid),
    ("Deposit", date!(2025 - 06 - 27), 55_075, InstallmentStatus::Paid),
];

/// The same six-step plan for every client, latest due date first.
pub fn demo_installments(clients: &[Client]) -> Vec<Installment> {
    clients
        .iter()
        .flat_map(|client| PLAN.iter().map(move |step| (client, step)))
        .enumerate()
        .map(|(index, (client, (label, due, amount, status)))| {
            Installment::from_new(
                RowId::new(format!("I-{}", 1001 + index)),
                NewInstallment {
                    client_id: client.id.clone(),
                    label: (*label).to_owned(),
                    due_date: *due,
                    amount_cents: *amount,
                    status: *status,
                },
            )
        })
        .collect()
}

fn example_email(name: &str) -> String {
    let local = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(".");
    format!("{local}@example.com")
}

#[cfg(test)]
mod tests {
    use super::{demo_agents, demo_clients, demo_installments, demo_leads, example_email};
    use estatery_app::{ClientStatus, InstallmentStatus, Record};

    #[test]
    fn demo_clients_cover_every_status() {
        let clients = demo_clients();
        assert_eq!(clients.len(), 9);
        let on_going = clients
            .iter()
            .filter(|client| client.status == ClientStatus::OnGoing)
            .count();
        assert_eq!(on_going, 7);
        assert_eq!(clients[6].name, "David Martinez");
        assert_eq!(clients[0].id().as_str(), "C-1001");
    }

    #[test]
    fn demo_emails_follow_names() {
        assert_eq!(example_email("Sarah Lee"), "sarah.lee@example.com");
        assert_eq!(demo_leads()[2].email, "robert.brown@example.com");
        assert_eq!(demo_agents()[1].email, "jonathan.cruz@example.com");
    }

    #[test]
    fn every_demo_client_has_the_six_step_plan() {
        let clients = demo_clients();
        let installments = demo_installments(&clients);
        assert_eq!(installments.len(), 6 * clients.len());
        let first: Vec<_> = installments
            .iter()
            .filter(|row| row.client_id == clients[0].id)
            .collect();
        assert_eq!(first.len(), 6);
        assert_eq!(first[0].id().as_str(), "I-1001");
        assert_eq!(
            first
                .iter()
                .filter(|row| row.status == InstallmentStatus::Paid)
                .count(),
            2
        );
    }
}
