// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use time::Date;

use crate::model::{AgentStatus, DiscountStatus, NewAgent, NewDiscount};

/// Rating every newly added agent starts with.
pub const NEW_AGENT_RATING: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentFormInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub properties: i64,
    pub deals_closed: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscountFormInput {
    pub name: String,
    pub code: String,
    pub percentage: i64,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl AgentFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("agent name is required -- enter a full name and retry");
        }
        if self.email.trim().is_empty() {
            bail!("agent email is required -- enter an email address and retry");
        }
        if self.properties < 0 || self.deals_closed < 0 {
            bail!("agent property and deal counts cannot be negative");
        }
        Ok(())
    }

    /// New agents wait for approval.
    pub fn into_new(self) -> Result<NewAgent> {
        self.validate()?;
        let phone = self.phone.trim();
        Ok(NewAgent {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: (!phone.is_empty()).then(|| phone.to_owned()),
            properties: self.properties,
            deals_closed: self.deals_closed,
            rating: NEW_AGENT_RATING,
            status: AgentStatus::Pending,
        })
    }
}

impl DiscountFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("discount name is required -- enter a name and retry");
        }
        if self.code.trim().is_empty() {
            bail!("discount code is required -- enter a promo code and retry");
        }
        if !(1..=100).contains(&self.percentage) {
            bail!(
                "discount percentage must be between 1 and 100, got {}",
                self.percentage
            );
        }
        let (Some(start_date), Some(end_date)) = (self.start_date, self.end_date) else {
            bail!("discount start and end dates are required -- pick both and retry");
        };
        if end_date < start_date {
            bail!("discount end date must be on/after start date");
        }
        Ok(())
    }

    /// Codes are stored upper-cased; new discounts start out scheduled.
    pub fn into_new(self) -> Result<NewDiscount> {
        self.validate()?;
        let (Some(start_date), Some(end_date)) = (self.start_date, self.end_date) else {
            bail!("discount start and end dates are required -- pick both and retry");
        };
        Ok(NewDiscount {
            name: self.name.trim().to_owned(),
            code: self.code.trim().to_uppercase(),
            percentage: self.percentage,
            properties_count: 0,
            start_date,
            end_date,
            status: DiscountStatus::Scheduled,
        })
    }
}
