// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::borrow::Cow;
use std::fmt;
use time::Date;

use crate::ids::RowId;
use crate::model::*;

/// Value a row exposes for one sortable field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortKey<'a> {
    Text(&'a str),
    Integer(i64),
    Decimal(f64),
    Date(Date),
}

/// Per-entity configuration consumed by the generic table engine.
pub trait Record: Clone + fmt::Debug {
    type Status: Label;
    /// Second filter dimension next to status, such as a payment's Rent/Sale kind.
    type Category: Label;
    type SortField: Label;
    type New: Clone + fmt::Debug;
    type Patch: Clone + fmt::Debug + Default;

    const KIND: EntityKind;
    const DEFAULT_SORT: Self::SortField;
    /// What the category means for this table; `None` when it has no category filter.
    const CATEGORY_NAME: Option<&'static str> = None;

    fn id(&self) -> &RowId;

    fn status(&self) -> Self::Status;

    fn category(&self) -> Option<Self::Category> {
        None
    }

    /// Fields the free-text search looks at.
    fn searchable_fields(&self) -> Vec<Cow<'_, str>>;

    fn sort_key(&self, field: Self::SortField) -> SortKey<'_>;

    fn create(id: RowId, new: Self::New) -> Self;

    fn apply(&mut self, patch: Self::Patch);

    fn status_patch(status: Self::Status) -> Self::Patch;
}

impl Record for Client {
    type Status = ClientStatus;
    type Category = DealType;
    type SortField = ClientSortField;
    type New = NewClient;
    type Patch = ClientPatch;

    const KIND: EntityKind = EntityKind::Client;
    const DEFAULT_SORT: ClientSortField = ClientSortField::Name;
    const CATEGORY_NAME: Option<&'static str> = Some("deal type");

    fn id(&self) -> &RowId {
        &self.id
    }

    fn status(&self) -> ClientStatus {
        self.status
    }

    fn category(&self) -> Option<DealType> {
        Some(self.deal)
    }

    fn searchable_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.name.as_str().into(),
            self.property_name.as_str().into(),
            self.property_address.as_str().into(),
            self.client_number.as_str().into(),
            self.id.as_str().into(),
        ]
    }

    fn sort_key(&self, field: ClientSortField) -> SortKey<'_> {
        match field {
            ClientSortField::Name => SortKey::Text(&self.name),
            ClientSortField::Amount => SortKey::Integer(self.amount_cents),
            ClientSortField::NextPayment => SortKey::Date(self.next_payment),
        }
    }

    fn create(id: RowId, new: NewClient) -> Self {
        Self::from_new(id, new)
    }

    fn apply(&mut self, patch: ClientPatch) {
        self.apply_patch(patch);
    }

    fn status_patch(status: ClientStatus) -> ClientPatch {
        ClientPatch {
            status: Some(status),
            ..ClientPatch::default()
        }
    }
}

impl Record for Payment {
    type Status = PaymentStatus;
    type Category = PaymentType;
    type SortField = PaymentSortField;
    type New = NewPayment;
    type Patch = PaymentPatch;

    const KIND: EntityKind = EntityKind::Payment;
    const DEFAULT_SORT: PaymentSortField = PaymentSortField::Type;
    const CATEGORY_NAME: Option<&'static str> = Some("type");

    fn id(&self) -> &RowId {
        &self.id
    }

    fn status(&self) -> PaymentStatus {
        self.status
    }

    fn category(&self) -> Option<PaymentType> {
        Some(self.kind)
    }

    fn searchable_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.id.as_str().into(),
            self.customer.as_str().into(),
            self.property.as_str().into(),
        ]
    }

    fn sort_key(&self, field: PaymentSortField) -> SortKey<'_> {
        match field {
            PaymentSortField::Type => SortKey::Text(self.kind.as_str()),
            PaymentSortField::Date => SortKey::Date(self.date),
            PaymentSortField::Amount => SortKey::Integer(self.amount_cents),
            PaymentSortField::Customer => SortKey::Text(&self.customer),
        }
    }

    fn create(id: RowId, new: NewPayment) -> Self {
        Self::from_new(id, new)
    }

    fn apply(&mut self, patch: PaymentPatch) {
        self.apply_patch(patch);
    }

    fn status_patch(status: PaymentStatus) -> PaymentPatch {
        PaymentPatch {
            status: Some(status),
            ..PaymentPatch::default()
        }
    }
}

impl Record for Transaction {
    type Status = TransactionStatus;
    type Category = PaymentType;
    type SortField = TransactionSortField;
    type New = NewTransaction;
    type Patch = TransactionPatch;

    const KIND: EntityKind = EntityKind::Transaction;
    const DEFAULT_SORT: TransactionSortField = TransactionSortField::Date;
    const CATEGORY_NAME: Option<&'static str> = Some("type");

    fn id(&self) -> &RowId {
        &self.id
    }

    fn status(&self) -> TransactionStatus {
        self.status
    }

    fn category(&self) -> Option<PaymentType> {
        Some(self.kind)
    }

    fn searchable_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.id.as_str().into(),
            self.customer.as_str().into(),
            self.property.as_str().into(),
            self.address.as_str().into(),
        ]
    }

    fn sort_key(&self, field: TransactionSortField) -> SortKey<'_> {
        match field {
            TransactionSortField::Date => SortKey::Date(self.date),
            TransactionSortField::Amount => SortKey::Integer(self.amount_cents),
            TransactionSortField::Customer => SortKey::Text(&self.customer),
        }
    }

    fn create(id: RowId, new: NewTransaction) -> Self {
        Self::from_new(id, new)
    }

    fn apply(&mut self, patch: TransactionPatch) {
        self.apply_patch(patch);
    }

    fn status_patch(status: TransactionStatus) -> TransactionPatch {
        TransactionPatch {
            status: Some(status),
            ..TransactionPatch::default()
        }
    }
}

impl Record for Lead {
    type Status = LeadStage;
    type Category = LeadSource;
    type SortField = LeadSortField;
    type New = NewLead;
    type Patch = LeadPatch;

    const KIND: EntityKind = EntityKind::Lead;
    const DEFAULT_SORT: LeadSortField = LeadSortField::CreatedAt;
    const CATEGORY_NAME: Option<&'static str> = Some("source");

    fn id(&self) -> &RowId {
        &self.id
    }

    fn status(&self) -> LeadStage {
        self.stage
    }

    fn category(&self) -> Option<LeadSource> {
        Some(self.source)
    }

    fn searchable_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.name.as_str().into(),
            self.email.as_str().into(),
            self.id.as_str().into(),
        ]
    }

    fn sort_key(&self, field: LeadSortField) -> SortKey<'_> {
        match field {
            LeadSortField::CreatedAt => SortKey::Date(self.created_at),
            LeadSortField::Name => SortKey::Text(&self.name),
        }
    }

    fn create(id: RowId, new: NewLead) -> Self {
        Self::from_new(id, new)
    }

    fn apply(&mut self, patch: LeadPatch) {
        self.apply_patch(patch);
    }

    fn status_patch(stage: LeadStage) -> LeadPatch {
        LeadPatch {
            stage: Some(stage),
            ..LeadPatch::default()
        }
    }
}

impl Record for Discount {
    type Status = DiscountStatus;
    type Category = Uncategorized;
    type SortField = DiscountSortField;
    type New = NewDiscount;
    type Patch = DiscountPatch;

    const KIND: EntityKind = EntityKind::Discount;
    const DEFAULT_SORT: DiscountSortField = DiscountSortField::Name;

    fn id(&self) -> &RowId {
        &self.id
    }

    fn status(&self) -> DiscountStatus {
        self.status
    }

    fn searchable_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.name.as_str().into(),
            self.code.as_str().into(),
            self.id.as_str().into(),
        ]
    }

    fn sort_key(&self, field: DiscountSortField) -> SortKey<'_> {
        match field {
            DiscountSortField::Name => SortKey::Text(&self.name),
            DiscountSortField::Percentage => SortKey::Integer(self.percentage),
            DiscountSortField::StartDate => SortKey::Date(self.start_date),
            DiscountSortField::EndDate => SortKey::Date(self.end_date),
        }
    }

    fn create(id: RowId, new: NewDiscount) -> Self {
        Self::from_new(id, new)
    }

    fn apply(&mut self, patch: DiscountPatch) {
        self.apply_patch(patch);
    }

    fn status_patch(status: DiscountStatus) -> DiscountPatch {
        DiscountPatch {
            status: Some(status),
            ..DiscountPatch::default()
        }
    }
}

impl Record for Agent {
    type Status = AgentStatus;
    type Category = Uncategorized;
    type SortField = AgentSortField;
    type New = NewAgent;
    type Patch = AgentPatch;

    const KIND: EntityKind = EntityKind::Agent;
    const DEFAULT_SORT: AgentSortField = AgentSortField::Name;

    fn id(&self) -> &RowId {
        &self.id
    }

    fn status(&self) -> AgentStatus {
        self.status
    }

    fn searchable_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.name.as_str().into(),
            self.email.as_str().into(),
            self.id.as_str().into(),
        ]
    }

    fn sort_key(&self, field: AgentSortField) -> SortKey<'_> {
        match field {
            AgentSortField::Name => SortKey::Text(&self.name),
            AgentSortField::Properties => SortKey::Integer(self.properties),
            AgentSortField::DealsClosed => SortKey::Integer(self.deals_closed),
            AgentSortField::Rating => SortKey::Decimal(self.rating),
        }
    }

    fn create(id: RowId, new: NewAgent) -> Self {
        Self::from_new(id, new)
    }

    fn apply(&mut self, patch: AgentPatch) {
        self.apply_patch(patch);
    }

    fn status_patch(status: AgentStatus) -> AgentPatch {
        AgentPatch {
            status: Some(status),
            ..AgentPatch::default()
        }
    }
}

impl Record for Installment {
    type Status = InstallmentStatus;
    type Category = Uncategorized;
    type SortField = InstallmentSortField;
    type New = NewInstallment;
    type Patch = InstallmentPatch;

    const KIND: EntityKind = EntityKind::Installment;
    const DEFAULT_SORT: InstallmentSortField = InstallmentSortField::DueDate;

    fn id(&self) -> &RowId {
        &self.id
    }

    fn status(&self) -> InstallmentStatus {
        self.status
    }

    fn searchable_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.id.as_str().into(),
            self.label.as_str().into(),
            format_date(self.due_date).into(),
        ]
    }

    fn sort_key(&self, field: InstallmentSortField) -> SortKey<'_> {
        match field {
            InstallmentSortField::DueDate => SortKey::Date(self.due_date),
            InstallmentSortField::Amount => SortKey::Integer(self.amount_cents),
        }
    }

    fn create(id: RowId, new: NewInstallment) -> Self {
        Self::from_new(id, new)
    }

    fn apply(&mut self, patch: InstallmentPatch) {
        self.apply_patch(patch);
    }

    fn status_patch(status: InstallmentStatus) -> InstallmentPatch {
        InstallmentPatch {
            status: Some(status),
            ..InstallmentPatch::default()
        }
    }
}
