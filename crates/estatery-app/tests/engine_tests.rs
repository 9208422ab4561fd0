// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use estatery_app::{
    Agent, AgentAction, AgentStatus, Client, ClientStatus, ConfirmationGate, CsvRecord, Discount,
    GateState, Installment, Lead, LeadStage, PageLink, Payment, PaymentSortField, Record,
    RecordStore, SelectScope, SortDirection, StatusFilter, TableCommand, TableState, Transaction,
    TransactionPatch, export_csv, import_csv, parse_csv,
};
use estatery_testkit::{ConsoleFaker, FIXTURE_DAVID_INDEX, fixture_clients};
use std::num::NonZeroUsize;

#[test]
fn on_going_filter_fits_one_page() {
    let clients = fixture_clients();
    let mut table = TableState::<Client>::default();
    table.dispatch(TableCommand::SetStatusFilter(StatusFilter::Only(
        ClientStatus::OnGoing,
    )));

    let projection = table.project(&clients);
    assert_eq!(projection.rows.len(), 7);
    assert_eq!(projection.window.page_count, 1);
    assert_eq!(projection.window.links(), vec![PageLink::Page(1)]);
}

#[test]
fn search_finds_david_under_any_matching_filter() {
    let clients = fixture_clients();
    let david = clients[FIXTURE_DAVID_INDEX].id().clone();

    for filter in [
        StatusFilter::All,
        StatusFilter::Only(ClientStatus::OnGoing),
    ] {
        let mut table = TableState::<Client>::default();
        table.dispatch(TableCommand::SetStatusFilter(filter));
        table.dispatch(TableCommand::SetSearch("  DAV ".to_owned()));
        let projection = table.project(&clients);
        let ids: Vec<_> = projection.rows.iter().map(|row| row.id().clone()).collect();
        assert_eq!(ids, vec![david.clone()]);
    }

    let mut table = TableState::<Client>::default();
    table.dispatch(TableCommand::SetStatusFilter(StatusFilter::Only(
        ClientStatus::Overdue,
    )));
    table.dispatch(TableCommand::SetSearch("dav".to_owned()));
    assert!(table.project(&clients).rows.is_empty());
}

#[test]
fn paging_through_descending_amounts_visits_every_payment_once() {
    let mut faker = ConsoleFaker::new(11);
    let payments = faker.store_of::<Payment, _>(20, ConsoleFaker::payment);
    let mut table = TableState::<Payment>::default();
    table.dispatch(TableCommand::SelectSort(PaymentSortField::Amount));
    table.dispatch(TableCommand::SelectSort(PaymentSortField::Amount));
    assert_eq!(table.sort.direction, SortDirection::Desc);

    let mut seen = Vec::new();
    for _ in 0..5 {
        let projection = table.project(payments.list());
        assert_eq!(projection.window.page_count, 3);
        seen.extend(projection.visible().iter().map(|row| row.amount_cents));
        table.dispatch(TableCommand::NextPage);
    }
    // The last two requests clamp to page 3 and repeat it.
    assert_eq!(seen.len(), 8 + 8 + 4 + 4 + 4);
    let walked = &seen[..20];
    assert!(walked.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(table.current_page, 4);
}

#[test]
fn select_all_on_filtered_view_leaves_hidden_rows_alone() -> Result<()> {
    let mut faker = ConsoleFaker::new(17);
    let mut leads = faker.store_of::<Lead, _>(10, ConsoleFaker::lead);
    let ids: Vec<_> = leads.list().iter().map(|lead| lead.id().clone()).collect();
    for id in &ids[..3] {
        leads.update_one(id, Lead::status_patch(LeadStage::Negotiation))?;
    }
    for id in &ids[3..] {
        leads.update_one(id, Lead::status_patch(LeadStage::New))?;
    }

    let page_size = NonZeroUsize::new(8).unwrap_or(NonZeroUsize::MIN);
    let mut table = TableState::<Lead>::new(page_size, SelectScope::Filtered);
    table.dispatch(TableCommand::SetStatusFilter(StatusFilter::Only(
        LeadStage::Negotiation,
    )));
    let projection = table.project(leads.list());
    assert_eq!(projection.rows.len(), 3);
    table.toggle_all(&projection, true);
    assert_eq!(table.selection.len(), 3);

    let picked = table.selection.pick(&projection.rows);
    let bulk: Vec<_> = picked.iter().map(|lead| lead.id().clone()).collect();
    let results = leads.update_many(bulk.iter(), &Lead::status_patch(LeadStage::Closed));
    assert!(results.iter().all(|result| result.is_ok()));

    let counts = leads.status_counts();
    assert_eq!(counts.get(&LeadStage::Closed), Some(&3));
    assert_eq!(counts.get(&LeadStage::New), Some(&7));
    Ok(())
}

/// Exports `source`, imports the text into an empty store and exports again.
/// Both stores assign ids from the same starting point, so the texts must match.
fn assert_csv_round_trip<R: CsvRecord>(source: &RecordStore<R>) -> Result<()> {
    let rows: Vec<&R> = source.list().iter().collect();
    let text = export_csv(&rows)?;
    assert!(text.starts_with("\"ID\","), "{} header", R::KIND.as_str());
    assert!(!text.ends_with('\n'));

    let mut target = RecordStore::<R>::empty();
    let report = import_csv(&mut target, &text);
    assert!(
        report.skipped.is_empty(),
        "{}: {:?}",
        R::KIND.as_str(),
        report.skipped
    );
    assert_eq!(report.inserted.len(), source.len());

    let copied: Vec<&R> = target.list().iter().collect();
    assert_eq!(export_csv(&copied)?, text, "{} layout", R::KIND.as_str());
    Ok(())
}

#[test]
fn every_layout_round_trips_through_csv() -> Result<()> {
    let mut faker = ConsoleFaker::new(3);
    assert_csv_round_trip(&faker.store_of::<Client, _>(6, ConsoleFaker::client))?;
    assert_csv_round_trip(&faker.store_of::<Payment, _>(6, ConsoleFaker::payment))?;
    assert_csv_round_trip(&faker.store_of::<Transaction, _>(6, ConsoleFaker::transaction))?;
    assert_csv_round_trip(&faker.store_of::<Lead, _>(6, ConsoleFaker::lead))?;
    assert_csv_round_trip(&faker.store_of::<Discount, _>(6, ConsoleFaker::discount))?;
    assert_csv_round_trip(&faker.store_of::<Installment, _>(6, ConsoleFaker::installment))?;

    let mut first = true;
    let agents = faker.store_of::<Agent, _>(6, |faker| {
        let mut agent = faker.agent();
        if std::mem::take(&mut first) {
            agent.phone = None;
            agent.rating = 4.25;
        }
        agent
    });
    assert_eq!(agents.list()[0].phone, None);
    assert_csv_round_trip(&agents)?;
    Ok(())
}

#[test]
fn padded_text_fields_survive_the_round_trip() -> Result<()> {
    let mut faker = ConsoleFaker::new(4);
    let mut source = faker.store_of::<Transaction, _>(1, ConsoleFaker::transaction);
    let id = source.list()[0].id().clone();
    source.update_one(
        &id,
        TransactionPatch {
            customer: Some(" Ama".to_owned()),
            property: Some("  Pine View ".to_owned()),
            ..TransactionPatch::default()
        },
    )?;
    assert_csv_round_trip(&source)?;
    Ok(())
}

#[test]
fn import_skips_bad_lines_and_defaults_unknown_labels() {
    let text = "ID,Name,Email,Phone,Properties,Deals Closed,Rating,Status\n\
                A-1,Sam Ortiz,sam@example.com,,3,1,4.2,On Leave\n\
                A-2,Bad Row,bad@example.com,,many,1,4.0,Active\n\
                A-3,Rae Kim,rae@example.com,+1 555,5,2,4.8,Active";
    let parsed = parse_csv::<Agent>(text);
    assert_eq!(parsed.rows.len(), 2);
    assert_eq!(parsed.skipped.len(), 1);
    assert_eq!(parsed.skipped[0].line, 3);
    assert_eq!(parsed.rows[0].status, AgentStatus::Pending);
    assert_eq!(parsed.rows[0].phone, None);
    assert_eq!(parsed.rows[1].phone.as_deref(), Some("+1 555"));
}

#[test]
fn gate_keeps_only_the_latest_request() -> Result<()> {
    let mut faker = ConsoleFaker::new(5);
    let mut agents = faker.store_of::<Agent, _>(2, ConsoleFaker::agent);
    let first = agents.list()[0].clone();
    let second = agents.list()[1].clone();

    let mut gate = ConfirmationGate::<Agent>::new();
    gate.request(&first, AgentStatus::Inactive);
    let target = AgentStatus::Pending
        .after(AgentAction::Approve)
        .unwrap_or(AgentStatus::Active);
    gate.request(&second, target);
    assert!(matches!(
        gate.state(),
        GateState::Pending { subject_id, .. } if subject_id == second.id()
    ));

    let applied = gate.confirm(&mut agents)?;
    assert_eq!(applied.map(|agent| agent.status), Some(AgentStatus::Active));
    assert!(gate.is_idle());
    assert_eq!(gate.confirm(&mut agents)?, None);
    assert_eq!(agents.get(first.id()).map(|agent| agent.status), Some(first.status));
    Ok(())
}
