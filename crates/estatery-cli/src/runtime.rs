// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use estatery_app::{
    Agent, AgentAction, AgentFormInput, CategoryFilter, Client, ConfirmationGate, CsvRecord,
    Discount, DiscountFormInput, Installment, Label, Lead, PageLink, Payment, Projection, Record,
    RecordStore, RowId, SelectScope, StatusFilter, StoreError, TableCommand, TableState,
    Transaction, client_report_csv, client_report_file_name, conversion_rate, export_csv,
    export_file_name, format_cents, format_date, import_csv, sort_field_or_default,
};
use estatery_db::Store;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use time::Date;

use crate::config::Config;

/// Record types the binary can list, export, import and mutate.
pub trait ConsoleEntity: CsvRecord + Serialize + DeserializeOwned {
    /// Target status for a named domain action, when the action applies to this row.
    fn transition(&self, _action: &str) -> Option<Self::Status> {
        None
    }

    /// Extra summary line for `stats`.
    fn summary(_rows: &[Self]) -> Option<String> {
        None
    }
}

impl ConsoleEntity for Client {
    fn transition(&self, action: &str) -> Option<Self::Status> {
        action
            .eq_ignore_ascii_case("toggle")
            .then(|| self.status.toggled())
    }
}

impl ConsoleEntity for Payment {}

impl ConsoleEntity for Transaction {}

impl ConsoleEntity for Lead {
    fn transition(&self, action: &str) -> Option<Self::Status> {
        action
            .eq_ignore_ascii_case("advance")
            .then(|| self.stage.advanced())
    }

    fn summary(rows: &[Self]) -> Option<String> {
        Some(format!("conversion rate: {}%", conversion_rate(rows)))
    }
}

impl ConsoleEntity for Discount {
    fn transition(&self, action: &str) -> Option<Self::Status> {
        action
            .eq_ignore_ascii_case("toggle")
            .then(|| self.status.toggled())
    }
}

impl ConsoleEntity for Installment {}

impl ConsoleEntity for Agent {
    fn transition(&self, action: &str) -> Option<Self::Status> {
        let action = match action.to_ascii_lowercase().as_str() {
            "approve" => AgentAction::Approve,
            "deactivate" => AgentAction::Deactivate,
            "reactivate" => AgentAction::Reactivate,
            _ => return None,
        };
        self.status.after(action)
    }
}

/// Filter, sort and page requested on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub descending: bool,
    pub page: i64,
}

pub fn list<R: ConsoleEntity>(store: &Store, config: &Config, view: &ViewOptions) -> Result<String> {
    let records = open_records::<R>(store)?;
    let mut table = configured_table::<R>(config, view)?;
    let projection = table.project(records.list());
    Ok(render_page(&projection))
}

/// Writes the filtered and sorted rows, across every page, into the export directory.
pub fn export<R: ConsoleEntity>(
    store: &Store,
    config: &Config,
    view: &ViewOptions,
    today: Date,
) -> Result<PathBuf> {
    let records = open_records::<R>(store)?;
    let mut table = configured_table::<R>(config, view)?;
    let projection = table.project(records.list());
    let text = export_csv(&projection.rows)?;

    let dir = config.export_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("create export directory {}", dir.display()))?;
    let path = dir.join(export_file_name(R::KIND, &format_date(today)));
    fs::write(&path, text).with_context(|| format!("write export {}", path.display()))?;
    tracing::info!(
        entity = R::KIND.as_str(),
        rows = projection.rows.len(),
        path = %path.display(),
        "exported csv"
    );
    Ok(path)
}

pub fn import<R: ConsoleEntity>(store: &Store, path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read import file {}", path.display()))?;
    let mut records = open_records::<R>(store)?;
    let report = import_csv(&mut records, &text);

    let mut lines = vec![format!(
        "imported {} {}; skipped {} line(s)",
        report.inserted.len(),
        R::KIND.as_str(),
        report.skipped.len()
    )];
    lines.extend(report.skipped.iter().map(ToString::to_string));
    Ok(lines.join("\n"))
}

/// Changes one row's status after `confirm` approves the pending change.
/// `target` is a status label or a domain action such as `toggle`.
pub fn set_status<R: ConsoleEntity>(
    store: &Store,
    id: &str,
    target: &str,
    confirm: &mut dyn FnMut(&str) -> Result<bool>,
) -> Result<String> {
    let mut records = open_records::<R>(store)?;
    let id = RowId::from(id);
    let row = records
        .get(&id)
        .cloned()
        .ok_or_else(|| StoreError::NotFound {
            entity: R::KIND,
            id: id.clone(),
        })?;
    let to = resolve_target(&row, target)?;

    let mut gate = ConfirmationGate::<R>::new();
    gate.request(&row, to);
    let Some(question) = gate.pending().map(|change| {
        format!(
            "Change {} {} from {} to {}?",
            R::KIND.singular(),
            change.subject_id,
            change.from,
            change.to
        )
    }) else {
        return Ok(String::from("nothing to change"));
    };

    if !confirm(&question)? {
        gate.cancel();
        return Ok(String::from("cancelled; no changes made"));
    }
    match gate.confirm(&mut records)? {
        Some(updated) => Ok(format!(
            "{} {} is now {}",
            R::KIND.singular(),
            updated.id(),
            updated.status()
        )),
        None => Ok(String::from("nothing to change")),
    }
}

/// Selects every row the select-all checkbox would cover for `view` and moves
/// each one to `target`, one confirmed change per row.
pub fn bulk_status<R: ConsoleEntity>(
    store: &Store,
    config: &Config,
    view: &ViewOptions,
    target: &str,
    confirm: &mut dyn FnMut(&str) -> Result<bool>,
) -> Result<String> {
    let to = parse_status::<R>(target)?;
    let mut records = open_records::<R>(store)?;
    let mut table = configured_table::<R>(config, view)?;

    let selected: Vec<R> = {
        let projection = table.project(records.list());
        table.toggle_all(&projection, true);
        table
            .selection
            .pick(&projection.rows)
            .into_iter()
            .cloned()
            .collect()
    };
    if selected.is_empty() {
        return Ok(format!("no {} selected", R::KIND.as_str()));
    }

    let question = format!(
        "Change {} {} ({} scope) to {}?",
        selected.len(),
        R::KIND.as_str(),
        table.select_scope.as_str(),
        to
    );
    if !confirm(&question)? {
        table.dispatch(TableCommand::ClearSelection);
        return Ok(String::from("cancelled; no changes made"));
    }

    let mut gate = ConfirmationGate::<R>::new();
    let mut updated = 0;
    let mut failures = Vec::new();
    for row in &selected {
        gate.request(row, to);
        match gate.confirm(&mut records) {
            Ok(Some(_)) => updated += 1,
            Ok(None) => {}
            Err(error) => failures.push(error.to_string()),
        }
    }
    table.dispatch(TableCommand::ClearSelection);

    let mut lines = vec![format!("updated {updated} {} to {to}", R::KIND.as_str())];
    lines.extend(failures);
    Ok(lines.join("\n"))
}

pub fn stats<R: ConsoleEntity>(store: &Store) -> Result<String> {
    let records = open_records::<R>(store)?;
    let counts = records.status_counts();
    let mut lines: Vec<String> = R::Status::all()
        .iter()
        .map(|status| format!("{status}: {}", counts.get(status).copied().unwrap_or(0)))
        .collect();
    lines.push(format!("total: {}", records.len()));
    lines.extend(R::summary(records.list()));
    Ok(lines.join("\n"))
}

/// Ten installments per page on the client detail view.
pub const CLIENT_PLAN_PAGE_SIZE: NonZeroUsize = NonZeroUsize::MIN.saturating_add(9);

pub fn add_agent(store: &Store, input: AgentFormInput) -> Result<String> {
    let new = input.into_new()?;
    let mut records = open_records::<Agent>(store)?;
    let agent = records.insert_one(new);
    Ok(format!(
        "added agent {} ({}) as {}",
        agent.id, agent.name, agent.status
    ))
}

pub fn add_discount(store: &Store, input: DiscountFormInput) -> Result<String> {
    let new = input.into_new()?;
    let mut records = open_records::<Discount>(store)?;
    let discount = records.insert_one(new);
    Ok(format!(
        "added discount {} ({}) as {}",
        discount.id, discount.code, discount.status
    ))
}

/// One client's profile followed by a page of their installment plan.
pub fn client_detail(store: &Store, client_ref: &str, view: &ViewOptions) -> Result<String> {
    let client = find_client(store, client_ref)?;
    let plan = client_plan(store, &client)?;
    let mut table = table_for::<Installment>(CLIENT_PLAN_PAGE_SIZE, SelectScope::Page, view)?;
    let projection = table.project(&plan);

    let lines = [
        format!("{} ({}, client {})", client.name, client.id, client.client_number),
        format!("{}, {}", client.property_name, client.property_address),
        format!(
            "{} {}, next payment {}, {}",
            client.deal,
            format_cents(client.amount_cents),
            format_date(client.next_payment),
            client.status
        ),
        String::new(),
        render_page(&projection),
    ];
    Ok(lines.join("\n"))
}

/// Writes the client's whole plan, ignoring any filter, as `client-<number>-report.csv`.
pub fn client_report(store: &Store, config: &Config, client_ref: &str) -> Result<PathBuf> {
    let client = find_client(store, client_ref)?;
    let plan = client_plan(store, &client)?;
    let rows: Vec<&Installment> = plan.iter().collect();
    let text = client_report_csv(&rows)?;

    let dir = config.export_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("create export directory {}", dir.display()))?;
    let path = dir.join(client_report_file_name(&client));
    fs::write(&path, text).with_context(|| format!("write report {}", path.display()))?;
    tracing::info!(
        client = %client.id,
        rows = rows.len(),
        path = %path.display(),
        "wrote client report"
    );
    Ok(path)
}

/// Accepts the row id (`C-1001`) or the client number (`32484`).
fn find_client(store: &Store, client_ref: &str) -> Result<Client> {
    let wanted = client_ref.trim();
    let clients = open_records::<Client>(store)?;
    clients
        .list()
        .iter()
        .find(|client| client.id.as_str() == wanted || client.client_number == wanted)
        .cloned()
        .ok_or_else(|| {
            anyhow!(
                "no client with id or number {wanted:?}; run `estatery list clients` to see them"
            )
        })
}

fn client_plan(store: &Store, client: &Client) -> Result<Vec<Installment>> {
    let installments = open_records::<Installment>(store)?;
    Ok(installments
        .list()
        .iter()
        .filter(|row| row.client_id == client.id)
        .cloned()
        .collect())
}

fn open_records<R: ConsoleEntity>(
    store: &Store,
) -> Result<RecordStore<R, estatery_db::SqlitePersistence<'_>>> {
    RecordStore::open(store.persistence())
        .with_context(|| format!("load {} from the database", R::KIND.as_str()))
}

fn configured_table<R: Record>(config: &Config, view: &ViewOptions) -> Result<TableState<R>> {
    table_for(config.page_size(), config.select_all_scope(), view)
}

fn table_for<R: Record>(
    page_size: NonZeroUsize,
    scope: SelectScope,
    view: &ViewOptions,
) -> Result<TableState<R>> {
    let mut table = TableState::<R>::new(page_size, scope);
    if let Some(term) = &view.search {
        table.dispatch(TableCommand::SetSearch(term.clone()));
    }
    if let Some(raw) = &view.status {
        let filter = StatusFilter::parse(raw).ok_or_else(|| {
            anyhow!(
                "unknown {} status {raw:?}; use `all` or one of: {}",
                R::KIND.singular(),
                status_labels::<R>()
            )
        })?;
        table.dispatch(TableCommand::SetStatusFilter(filter));
    }
    if let Some(raw) = &view.category {
        let Some(name) = R::CATEGORY_NAME else {
            bail!("{} cannot be filtered by type", R::KIND.as_str());
        };
        let filter = CategoryFilter::parse(raw).ok_or_else(|| {
            anyhow!(
                "unknown {} {name} {raw:?}; use `all` or one of: {}",
                R::KIND.singular(),
                labels(R::Category::all())
            )
        })?;
        table.dispatch(TableCommand::SetCategoryFilter(filter));
    }

    let field = view
        .sort
        .as_deref()
        .map_or(R::DEFAULT_SORT, sort_field_or_default::<R>);
    if table.sort.field != field {
        table.dispatch(TableCommand::SelectSort(field));
    }
    if view.descending {
        table.dispatch(TableCommand::SelectSort(field));
    }
    table.dispatch(TableCommand::GoToPage(view.page));
    Ok(table)
}

fn resolve_target<R: ConsoleEntity>(row: &R, target: &str) -> Result<R::Status> {
    R::Status::parse_label(target)
        .or_else(|| row.transition(target))
        .ok_or_else(|| {
            anyhow!(
                "{target:?} is not a {} status ({}) or an action that applies to {} {}",
                R::KIND.singular(),
                status_labels::<R>(),
                R::KIND.singular(),
                row.id()
            )
        })
}

fn parse_status<R: Record>(target: &str) -> Result<R::Status> {
    R::Status::parse_label(target).ok_or_else(|| {
        anyhow!(
            "unknown {} status {target:?}; expected one of: {}",
            R::KIND.singular(),
            status_labels::<R>()
        )
    })
}

fn status_labels<R: Record>() -> String {
    labels(R::Status::all())
}

fn labels<L: Label>(all: &[L]) -> String {
    all.iter()
        .map(|label| label.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_page<R: CsvRecord>(projection: &Projection<'_, R>) -> String {
    let columns = R::csv_columns();
    let mut grid: Vec<Vec<String>> = vec![
        columns
            .iter()
            .map(|column| column.header.to_owned())
            .collect(),
    ];
    grid.extend(projection.visible().iter().map(|row| {
        columns
            .iter()
            .map(|column| (column.cell)(*row).unwrap_or_default())
            .collect::<Vec<_>>()
    }));

    let mut widths = vec![0; columns.len()];
    for cells in &grid {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines: Vec<String> = grid
        .iter()
        .map(|cells| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_owned()
        })
        .collect();

    let window = projection.window;
    lines.push(String::new());
    lines.push(format!(
        "Showing {}-{} of {}   page {}",
        window.showing_from(),
        window.showing_to(),
        window.total,
        page_strip(&window.links(), window.safe_page)
    ));
    lines.join("\n")
}

fn page_strip(links: &[PageLink], current: usize) -> String {
    links
        .iter()
        .map(|link| match link {
            PageLink::Page(page) if *page == current => format!("[{page}]"),
            PageLink::Page(page) => page.to_string(),
            PageLink::Ellipsis => String::from("..."),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
