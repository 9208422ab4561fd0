// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;
use time::macros::format_description;

use crate::ids::RowId;

/// Closed enumeration with a human label per variant.
pub trait Label: Copy + Eq + Ord + std::hash::Hash + fmt::Debug + fmt::Display + 'static {
    fn all() -> &'static [Self];

    fn label(self) -> &'static str;

    /// Case-insensitive; spaces, dashes and underscores are interchangeable.
    fn parse_label(value: &str) -> Option<Self> {
        let wanted = normalize_label(value);
        Self::all()
            .iter()
            .copied()
            .find(|candidate| normalize_label(candidate.label()) == wanted)
    }
}

fn normalize_label(value: &str) -> String {
    value
        .split(|ch: char| ch.is_whitespace() || ch == '-' || ch == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

macro_rules! labeled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                <Self as Label>::parse_label(value)
            }
        }

        impl Label for $name {
            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn label(self) -> &'static str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Declares a row struct plus its id-less insert form and its shallow-merge patch.
macro_rules! entity_record {
    (
        $(#[$meta:meta])*
        $name:ident, $new:ident, $patch:ident {
            $($field:ident: $ty:ty),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub id: RowId,
            $(pub $field: $ty),+
        }

        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $new {
            $(pub $field: $ty),+
        }

        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $patch {
            $(pub $field: Option<$ty>),+
        }

        impl $name {
            pub fn from_new(id: RowId, new: $new) -> Self {
                Self {
                    id,
                    $($field: new.$field),+
                }
            }

            pub fn apply_patch(&mut self, patch: $patch) {
                $(
                    if let Some(value) = patch.$field {
                        self.$field = value;
                    }
                )+
            }

            pub fn to_new(&self) -> $new {
                $new {
                    $($field: self.$field.clone()),+
                }
            }
        }
    };
}

labeled_enum!(EntityKind {
    Client => "clients",
    Payment => "payments",
    Transaction => "transactions",
    Lead => "leads",
    Discount => "discounts",
    Agent => "agents",
    Installment => "installments",
});

impl EntityKind {
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Client => "C",
            Self::Payment => "P",
            Self::Transaction => "T",
            Self::Lead => "L",
            Self::Discount => "D",
            Self::Agent => "A",
            Self::Installment => "I",
        }
    }

    pub const fn singular(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Payment => "payment",
            Self::Transaction => "transaction",
            Self::Lead => "lead",
            Self::Discount => "discount",
            Self::Agent => "agent",
            Self::Installment => "installment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

labeled_enum!(ClientStatus {
    OnGoing => "On Going",
    Completed => "Completed",
    Overdue => "Overdue",
});

impl ClientStatus {
    pub const fn toggled(self) -> Self {
        match self {
            Self::OnGoing => Self::Completed,
            Self::Completed => Self::OnGoing,
            Self::Overdue => Self::Completed,
        }
    }
}

labeled_enum!(DealType {
    Rent => "Rent",
    Buy => "Buy",
});

labeled_enum!(PaymentStatus {
    Pending => "Pending",
    Completed => "Completed",
    Failed => "Failed",
});

labeled_enum!(TransactionStatus {
    Success => "Success",
    Pending => "Pending",
    Failed => "Failed",
});

labeled_enum!(PaymentType {
    Rent => "Rent",
    Sale => "Sale",
});

labeled_enum!(LeadStage {
    New => "New",
    Contacted => "Contacted",
    TourScheduled => "Tour Scheduled",
    Negotiation => "Negotiation",
    Closed => "Closed",
});

impl LeadStage {
    /// Next pipeline stage; `Closed` stays closed.
    pub fn advanced(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|stage| *stage == self)
            .unwrap_or(0);
        Self::ALL[(index + 1).min(Self::ALL.len() - 1)]
    }
}

labeled_enum!(LeadSource {
    Website => "Website",
    Referral => "Referral",
    Ads => "Ads",
});

labeled_enum!(DiscountStatus {
    Active => "Active",
    Scheduled => "Scheduled",
    Expired => "Expired",
});

impl DiscountStatus {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Expired,
            Self::Expired => Self::Active,
            Self::Scheduled => Self::Scheduled,
        }
    }
}

labeled_enum!(AgentStatus {
    Active => "Active",
    Pending => "Pending",
    Inactive => "Inactive",
});

labeled_enum!(InstallmentStatus {
    Pending => "Pending",
    Paid => "Paid",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentAction {
    Approve,
    Deactivate,
    Reactivate,
}

impl AgentStatus {
    /// Target status for `action`, or `None` when the action does not apply.
    pub const fn after(self, action: AgentAction) -> Option<Self> {
        match (self, action) {
            (Self::Pending, AgentAction::Approve) => Some(Self::Active),
            (Self::Active, AgentAction::Deactivate) => Some(Self::Inactive),
            (Self::Inactive, AgentAction::Reactivate) => Some(Self::Active),
            _ => None,
        }
    }
}

labeled_enum!(
    /// Category of tables with no secondary filter; no row reports it.
    Uncategorized {
        Uncategorized => "uncategorized",
    }
);

labeled_enum!(ClientSortField {
    Name => "name",
    Amount => "amount",
    NextPayment => "next payment",
});

labeled_enum!(PaymentSortField {
    Type => "type",
    Date => "date",
    Amount => "amount",
    Customer => "customer",
});

labeled_enum!(TransactionSortField {
    Date => "date",
    Amount => "amount",
    Customer => "customer",
});

labeled_enum!(LeadSortField {
    CreatedAt => "created",
    Name => "name",
});

labeled_enum!(DiscountSortField {
    Name => "name",
    Percentage => "percentage",
    StartDate => "start date",
    EndDate => "end date",
});

labeled_enum!(InstallmentSortField {
    DueDate => "due date",
    Amount => "amount",
});

labeled_enum!(AgentSortField {
    Name => "name",
    Properties => "properties",
    DealsClosed => "deals closed",
    Rating => "rating",
});

entity_record!(
    /// A tenant or buyer with a running payment plan.
    Client, NewClient, ClientPatch {
        client_number: String,
        name: String,
        property_name: String,
        property_address: String,
        deal: DealType,
        amount_cents: i64,
        next_payment: Date,
        status: ClientStatus,
    }
);

entity_record!(
    /// Dashboard "recent payments" entry.
    Payment, NewPayment, PaymentPatch {
        date: Date,
        property: String,
        address: String,
        customer: String,
        kind: PaymentType,
        amount_cents: i64,
        status: PaymentStatus,
    }
);

entity_record!(
    Transaction, NewTransaction, TransactionPatch {
        date: Date,
        property: String,
        address: String,
        customer: String,
        kind: PaymentType,
        amount_cents: i64,
        status: TransactionStatus,
    }
);

entity_record!(
    Lead, NewLead, LeadPatch {
        name: String,
        email: String,
        property_ref: String,
        source: LeadSource,
        budget: String,
        stage: LeadStage,
        created_at: Date,
    }
);

entity_record!(
    Discount, NewDiscount, DiscountPatch {
        name: String,
        code: String,
        percentage: i64,
        properties_count: i64,
        start_date: Date,
        end_date: Date,
        status: DiscountStatus,
    }
);

entity_record!(
    Agent, NewAgent, AgentPatch {
        name: String,
        email: String,
        phone: Option<String>,
        properties: i64,
        deals_closed: i64,
        rating: f64,
        status: AgentStatus,
    }
);

entity_record!(
    /// One scheduled payment in a client's plan, e.g. "3rd Payment".
    Installment, NewInstallment, InstallmentPatch {
        client_id: RowId,
        label: String,
        due_date: Date,
        amount_cents: i64,
        status: InstallmentStatus,
    }
);

impl Client {
    pub fn initials(&self) -> String {
        initials(&self.name)
    }
}

impl Agent {
    pub fn initials(&self) -> String {
        initials(&self.name)
    }
}

/// First letter of up to two words, upper-cased: "Sarah Lee" -> "SL".
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Share of closed leads, rounded to a whole percent.
pub fn conversion_rate(leads: &[Lead]) -> u32 {
    if leads.is_empty() {
        return 0;
    }
    let closed = leads
        .iter()
        .filter(|lead| lead.stage == LeadStage::Closed)
        .count();
    ((closed as f64 / leads.len() as f64) * 100.0).round() as u32
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100)
}

/// Accepts `1800`, `1,800.5`, `₵1,800.00` or `-12.30`; at most two decimals.
pub fn parse_cents(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ',' | '₵' | '$' | ' '))
        .collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > 2
        || !whole.chars().all(|ch| ch.is_ascii_digit())
        || !fraction.chars().all(|ch| ch.is_ascii_digit())
    {
        return None;
    }
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    let cents = whole.checked_mul(100)?.checked_add(fraction)?;
    Some(if negative { -cents } else { cents })
}

pub fn format_date(value: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    value
        .format(&format)
        .unwrap_or_else(|_| value.to_string())
}

pub fn parse_date(raw: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw.trim(), &format).ok()
}
