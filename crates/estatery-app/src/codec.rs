// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use thiserror::Error;

use crate::ids::RowId;
use crate::model::*;
use crate::record::Record;
use crate::store::{Persistence, RecordStore};

pub const CSV_MIME: &str = "text/csv;charset=utf-8;";

/// `<entity>-<context>.csv`, e.g. `transactions-2025-07-08.csv`.
pub fn export_file_name(entity: EntityKind, context: &str) -> String {
    format!("{}-{context}.csv", entity.as_str())
}

/// One exported column: header label plus cell extractor. `None` becomes an empty cell.
pub struct CsvColumn<R> {
    pub header: &'static str,
    pub cell: fn(&R) -> Option<String>,
}

impl<R> CsvColumn<R> {
    const fn new(header: &'static str, cell: fn(&R) -> Option<String>) -> Self {
        Self { header, cell }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineDefect {
    #[error("expected {expected} columns, found {found}")]
    TooFewColumns { found: usize, expected: usize },
    #[error("{column} value {value:?} is not valid")]
    InvalidValue { column: &'static str, value: String },
    #[error("unreadable record: {0}")]
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("skipped line {line}: {defect}")]
pub struct MalformedImportLine {
    pub line: u64,
    pub defect: LineDefect,
}

/// Positional CSV layout for one entity. The first column is always the row id,
/// which import ignores.
pub trait CsvRecord: Record {
    fn csv_columns() -> Vec<CsvColumn<Self>>;

    /// `fields` excludes the id column and holds at least `csv_columns().len() - 1` values.
    fn from_csv_fields(fields: &[&str]) -> Result<Self::New, LineDefect>;
}

/// Quotes every field; lines are joined with `\n` without a trailing newline.
pub fn export_csv<R: CsvRecord>(rows: &[&R]) -> Result<String> {
    write_csv(&R::csv_columns(), rows)
}

/// `client-<client number>-report.csv`.
pub fn client_report_file_name(client: &Client) -> String {
    format!("client-{}-report.csv", client.client_number)
}

/// A client's installment plan in the report layout. The client column is
/// implied by the file, so it is left out.
pub fn client_report_csv(installments: &[&Installment]) -> Result<String> {
    let column = CsvColumn::<Installment>::new;
    let columns = [
        column("Transaction ID", |row| Some(row.id.to_string())),
        column("Payment Type", |row| Some(row.label.clone())),
        column("Due Date", |row| Some(format_date(row.due_date))),
        column("Amount", |row| Some(format_cents(row.amount_cents))),
        column("Status", |row| Some(row.status.to_string())),
    ];
    write_csv(&columns, installments)
}

fn write_csv<R: Record>(columns: &[CsvColumn<R>], rows: &[&R]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(columns.iter().map(|column| column.header))
        .context("write CSV header")?;
    for row in rows {
        writer
            .write_record(
                columns
                    .iter()
                    .map(|column| (column.cell)(*row).unwrap_or_default()),
            )
            .with_context(|| format!("write CSV line for {}", row.id()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| anyhow::anyhow!("flush CSV output: {}", error.error()))?;
    let mut text = String::from_utf8(bytes).context("CSV output is not UTF-8")?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

#[derive(Debug, Clone)]
pub struct ParsedImport<N> {
    pub rows: Vec<N>,
    pub skipped: Vec<MalformedImportLine>,
}

#[derive(Debug, Clone)]
pub struct ImportReport<R> {
    pub inserted: Vec<R>,
    pub skipped: Vec<MalformedImportLine>,
}

/// Best-effort parse: the header line is skipped unchecked and malformed lines
/// are collected instead of aborting. Text cells are kept byte for byte; only
/// numeric, date and label cells ignore surrounding whitespace.
pub fn parse_csv<R: CsvRecord>(text: &str) -> ParsedImport<R::New> {
    let expected = R::csv_columns().len();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut parsed = ParsedImport {
        rows: Vec::new(),
        skipped: Vec::new(),
    };
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(error) => {
                let line = error.position().map_or(0, |position| position.line());
                parsed.skipped.push(MalformedImportLine {
                    line,
                    defect: LineDefect::Unreadable(error.to_string()),
                });
                continue;
            }
        };
        let line = record.position().map_or(0, |position| position.line());
        if record.len() < expected {
            parsed.skipped.push(MalformedImportLine {
                line,
                defect: LineDefect::TooFewColumns {
                    found: record.len(),
                    expected,
                },
            });
            continue;
        }
        let fields: Vec<&str> = record.iter().skip(1).collect();
        match R::from_csv_fields(&fields) {
            Ok(row) => parsed.rows.push(row),
            Err(defect) => parsed.skipped.push(MalformedImportLine { line, defect }),
        }
    }

    for skipped in &parsed.skipped {
        tracing::warn!(entity = R::KIND.as_str(), "{skipped}");
    }
    parsed
}

/// Parses `text` and prepends the good rows, in file order, through the store.
pub fn import_csv<R, P>(store: &mut RecordStore<R, P>, text: &str) -> ImportReport<R>
where
    R: CsvRecord,
    P: Persistence<R>,
{
    let ParsedImport { rows, skipped } = parse_csv::<R>(text);
    let inserted = store.insert_batch(rows);
    tracing::info!(
        entity = R::KIND.as_str(),
        inserted = inserted.len(),
        skipped = skipped.len(),
        "imported CSV"
    );
    ImportReport { inserted, skipped }
}

fn cents(column: &'static str, value: &str) -> Result<i64, LineDefect> {
    parse_cents(value).ok_or_else(|| invalid(column, value))
}

fn date(column: &'static str, value: &str) -> Result<time::Date, LineDefect> {
    parse_date(value).ok_or_else(|| invalid(column, value))
}

fn integer(column: &'static str, value: &str) -> Result<i64, LineDefect> {
    value.trim().parse().map_err(|_| invalid(column, value))
}

fn decimal(column: &'static str, value: &str) -> Result<f64, LineDefect> {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(invalid(column, value)),
    }
}

/// Blank cells mean "not provided", so an exported blank phone comes back as `None`.
fn optional_text(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_owned())
}

/// Unknown enum cells fall back to `default`.
fn label_or<L: Label>(value: &str, default: L) -> L {
    L::parse_label(value).unwrap_or(default)
}

fn invalid(column: &'static str, value: &str) -> LineDefect {
    LineDefect::InvalidValue {
        column,
        value: value.to_owned(),
    }
}

impl CsvRecord for Client {
    fn csv_columns() -> Vec<CsvColumn<Self>> {
        let column = CsvColumn::<Self>::new;
        vec![
            column("ID", |row| Some(row.id.to_string())),
            column("Client Number", |row| Some(row.client_number.clone())),
            column("Client Name", |row| Some(row.name.clone())),
            column("Property Name", |row| Some(row.property_name.clone())),
            column("Property Address", |row| Some(row.property_address.clone())),
            column("Type", |row| Some(row.deal.to_string())),
            column("Amount", |row| Some(format_cents(row.amount_cents))),
            column("Next Payment", |row| Some(format_date(row.next_payment))),
            column("Status", |row| Some(row.status.to_string())),
        ]
    }

    fn from_csv_fields(fields: &[&str]) -> Result<NewClient, LineDefect> {
        Ok(NewClient {
            client_number: fields[0].to_owned(),
            name: fields[1].to_owned(),
            property_name: fields[2].to_owned(),
            property_address: fields[3].to_owned(),
            deal: label_or(fields[4], DealType::Rent),
            amount_cents: cents("Amount", fields[5])?,
            next_payment: date("Next Payment", fields[6])?,
            status: label_or(fields[7], ClientStatus::OnGoing),
        })
    }
}

impl CsvRecord for Payment {
    fn csv_columns() -> Vec<CsvColumn<Self>> {
        let column = CsvColumn::<Self>::new;
        vec![
            column("ID", |row| Some(row.id.to_string())),
            column("Date", |row| Some(format_date(row.date))),
            column("Property", |row| Some(row.property.clone())),
            column("Address", |row| Some(row.address.clone())),
            column("Customer", |row| Some(row.customer.clone())),
            column("Type", |row| Some(row.kind.to_string())),
            column("Amount", |row| Some(format_cents(row.amount_cents))),
            column("Status", |row| Some(row.status.to_string())),
        ]
    }

    fn from_csv_fields(fields: &[&str]) -> Result<NewPayment, LineDefect> {
        Ok(NewPayment {
            date: date("Date", fields[0])?,
            property: fields[1].to_owned(),
            address: fields[2].to_owned(),
            customer: fields[3].to_owned(),
            kind: label_or(fields[4], PaymentType::Rent),
            amount_cents: cents("Amount", fields[5])?,
            status: label_or(fields[6], PaymentStatus::Pending),
        })
    }
}

impl CsvRecord for Transaction {
    fn csv_columns() -> Vec<CsvColumn<Self>> {
        let column = CsvColumn::<Self>::new;
        vec![
            column("ID", |row| Some(row.id.to_string())),
            column("Date", |row| Some(format_date(row.date))),
            column("Property", |row| Some(row.property.clone())),
            column("Address", |row| Some(row.address.clone())),
            column("Customer", |row| Some(row.customer.clone())),
            column("Type", |row| Some(row.kind.to_string())),
            column("Amount", |row| Some(format_cents(row.amount_cents))),
            column("Status", |row| Some(row.status.to_string())),
        ]
    }

    fn from_csv_fields(fields: &[&str]) -> Result<NewTransaction, LineDefect> {
        Ok(NewTransaction {
            date: date("Date", fields[0])?,
            property: fields[1].to_owned(),
            address: fields[2].to_owned(),
            customer: fields[3].to_owned(),
            kind: label_or(fields[4], PaymentType::Rent),
            amount_cents: cents("Amount", fields[5])?,
            status: label_or(fields[6], TransactionStatus::Pending),
        })
    }
}

impl CsvRecord for Lead {
    fn csv_columns() -> Vec<CsvColumn<Self>> {
        let column = CsvColumn::<Self>::new;
        vec![
            column("ID", |row| Some(row.id.to_string())),
            column("Name", |row| Some(row.name.clone())),
            column("Email", |row| Some(row.email.clone())),
            column("Property", |row| Some(row.property_ref.clone())),
            column("Source", |row| Some(row.source.to_string())),
            column("Budget", |row| Some(row.budget.clone())),
            column("Stage", |row| Some(row.stage.to_string())),
            column("Created", |row| Some(format_date(row.created_at))),
        ]
    }

    fn from_csv_fields(fields: &[&str]) -> Result<NewLead, LineDefect> {
        Ok(NewLead {
            name: fields[0].to_owned(),
            email: fields[1].to_owned(),
            property_ref: fields[2].to_owned(),
            source: label_or(fields[3], LeadSource::Website),
            budget: fields[4].to_owned(),
            stage: label_or(fields[5], LeadStage::New),
            created_at: date("Created", fields[6])?,
        })
    }
}

impl CsvRecord for Discount {
    fn csv_columns() -> Vec<CsvColumn<Self>> {
        let column = CsvColumn::<Self>::new;
        vec![
            column("ID", |row| Some(row.id.to_string())),
            column("Name", |row| Some(row.name.clone())),
            column("Code", |row| Some(row.code.clone())),
            column("Percentage", |row| Some(row.percentage.to_string())),
            column("Properties", |row| Some(row.properties_count.to_string())),
            column("Start Date", |row| Some(format_date(row.start_date))),
            column("End Date", |row| Some(format_date(row.end_date))),
            column("Status", |row| Some(row.status.to_string())),
        ]
    }

    fn from_csv_fields(fields: &[&str]) -> Result<NewDiscount, LineDefect> {
        Ok(NewDiscount {
            name: fields[0].to_owned(),
            code: fields[1].to_owned(),
            percentage: integer("Percentage", fields[2])?,
            properties_count: integer("Properties", fields[3])?,
            start_date: date("Start Date", fields[4])?,
            end_date: date("End Date", fields[5])?,
            status: label_or(fields[6], DiscountStatus::Scheduled),
        })
    }
}

impl CsvRecord for Agent {
    fn csv_columns() -> Vec<CsvColumn<Self>> {
        let column = CsvColumn::<Self>::new;
        vec![
            column("ID", |row| Some(row.id.to_string())),
            column("Name", |row| Some(row.name.clone())),
            column("Email", |row| Some(row.email.clone())),
            column("Phone", |row| row.phone.clone()),
            column("Properties", |row| Some(row.properties.to_string())),
            column("Deals Closed", |row| Some(row.deals_closed.to_string())),
            column("Rating", |row| Some(row.rating.to_string())),
            column("Status", |row| Some(row.status.to_string())),
        ]
    }

    fn from_csv_fields(fields: &[&str]) -> Result<NewAgent, LineDefect> {
        Ok(NewAgent {
            name: fields[0].to_owned(),
            email: fields[1].to_owned(),
            phone: optional_text(fields[2]),
            properties: integer("Properties", fields[3])?,
            deals_closed: integer("Deals Closed", fields[4])?,
            rating: decimal("Rating", fields[5])?,
            status: label_or(fields[6], AgentStatus::Pending),
        })
    }
}

impl CsvRecord for Installment {
    fn csv_columns() -> Vec<CsvColumn<Self>> {
        let column = CsvColumn::<Self>::new;
        vec![
            column("ID", |row| Some(row.id.to_string())),
            column("Client", |row| Some(row.client_id.to_string())),
            column("Payment Type", |row| Some(row.label.clone())),
            column("Due Date", |row| Some(format_date(row.due_date))),
            column("Amount", |row| Some(format_cents(row.amount_cents))),
            column("Status", |row| Some(row.status.to_string())),
        ]
    }

    fn from_csv_fields(fields: &[&str]) -> Result<NewInstallment, LineDefect> {
        let client_id = fields[0].trim();
        if client_id.is_empty() {
            return Err(invalid("Client", fields[0]));
        }
        Ok(NewInstallment {
            client_id: RowId::from(client_id),
            label: fields[1].to_owned(),
            due_date: date("Due Date", fields[2])?,
            amount_cents: cents("Amount", fields[3])?,
            status: label_or(fields[4], InstallmentStatus::Pending),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CSV_MIME, CsvRecord, LineDefect, client_report_csv, client_report_file_name, export_csv,
        export_file_name, import_csv, parse_csv,
    };
    use crate::ids::RowId;
    use crate::model::{
        Agent, AgentStatus, Client, ClientStatus, DealType, Discount, DiscountStatus, EntityKind,
        Installment, InstallmentStatus, NewClient, NewInstallment, NewTransaction, PaymentType,
        Transaction, TransactionStatus,
    };
    use crate::store::RecordStore;
    use time::{Date, Month};

    fn transaction(id: &str, customer: &str) -> anyhow::Result<Transaction> {
        Ok(Transaction::from_new(
            RowId::from(id),
            NewTransaction {
                date: Date::from_calendar_date(2025, Month::July, 8)?,
                property: "Maple Grove \"North\"".to_owned(),
                address: "12 Elm St, Accra".to_owned(),
                customer: customer.to_owned(),
                kind: PaymentType::Sale,
                amount_cents: 1_520_000,
                status: TransactionStatus::Success,
            },
        ))
    }

    #[test]
    fn export_quotes_every_field_and_doubles_quotes() -> anyhow::Result<()> {
        let row = transaction("T-1001", "Ama Owusu")?;
        let text = export_csv(&[&row])?;
        assert_eq!(
            text,
            "\"ID\",\"Date\",\"Property\",\"Address\",\"Customer\",\"Type\",\"Amount\",\"Status\"\n\
             \"T-1001\",\"2025-07-08\",\"Maple Grove \"\"North\"\"\",\"12 Elm St, Accra\",\
             \"Ama Owusu\",\"Sale\",\"15200.00\",\"Success\""
        );
        Ok(())
    }

    #[test]
    fn export_of_no_rows_is_header_only() -> anyhow::Result<()> {
        let text = export_csv::<Transaction>(&[])?;
        assert!(!text.contains('\n'));
        assert!(text.starts_with("\"ID\""));
        Ok(())
    }

    #[test]
    fn missing_optional_cell_exports_empty() -> anyhow::Result<()> {
        let agent = Agent::from_new(
            RowId::from("A-1"),
            crate::model::NewAgent {
                name: "Kofi".to_owned(),
                email: "kofi@estatery.test".to_owned(),
                phone: None,
                properties: 2,
                deals_closed: 0,
                rating: 4.0,
                status: AgentStatus::Active,
            },
        );
        let text = export_csv(&[&agent])?;
        assert!(text.contains("\"kofi@estatery.test\",\"\",\"2\""));
        Ok(())
    }

    #[test]
    fn short_and_invalid_lines_are_skipped() {
        let text = "ID,Date,Property,Address,Customer,Type,Amount,Status\n\
                    T-1,2025-07-01,Pine,1 Road,Ama,Rent,100,Pending\n\
                    T-2,2025-07-01,Pine\n\
                    T-3,not-a-date,Pine,1 Road,Kofi,Rent,100,Pending\n\
                    T-4,2025-07-02,Oak,2 Road,Yaw,Lease,250.5,Unknown";
        let parsed = parse_csv::<Transaction>(text);

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[1].kind, PaymentType::Rent);
        assert_eq!(parsed.rows[1].status, TransactionStatus::Pending);
        assert_eq!(parsed.rows[1].amount_cents, 25_050);

        let lines: Vec<u64> = parsed.skipped.iter().map(|skip| skip.line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert_eq!(
            parsed.skipped[0].defect,
            LineDefect::TooFewColumns {
                found: 3,
                expected: 8
            }
        );
    }

    #[test]
    fn padded_text_survives_export_and_import() -> anyhow::Result<()> {
        let mut row = transaction("T-1001", " Ama")?;
        row.property = "  Pine View ".to_owned();
        let text = export_csv(&[&row])?;
        let parsed = parse_csv::<Transaction>(&text);
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.rows, vec![row.to_new()]);
        Ok(())
    }

    #[test]
    fn padded_numbers_dates_and_labels_still_parse() {
        let text = "h\nD-1,Spring,SPRING10, 10 , 2 , 2025-03-01 ,2025-03-31, active ";
        let parsed = parse_csv::<Discount>(text);
        assert!(parsed.skipped.is_empty(), "{:?}", parsed.skipped);
        let row = &parsed.rows[0];
        assert_eq!(row.percentage, 10);
        assert_eq!(row.properties_count, 2);
        assert_eq!(row.status, DiscountStatus::Active);
    }

    #[test]
    fn blank_phone_imports_as_none() {
        let text = "h\nA-1,Kofi,kofi@estatery.test,  ,2,0,4.0,Active";
        let parsed = parse_csv::<Agent>(text);
        assert_eq!(parsed.rows[0].phone, None);
    }

    #[test]
    fn quoted_commas_and_escaped_quotes_parse() {
        let text = "h\n\"T-1\",\"2025-07-01\",\"Pine, East\",\"1 \"\"A\"\" Road\",\"Ama\",\"Sale\",\"1,800.00\",\"Failed\"";
        let parsed = parse_csv::<Transaction>(text);
        assert!(parsed.skipped.is_empty());
        let row = &parsed.rows[0];
        assert_eq!(row.property, "Pine, East");
        assert_eq!(row.address, "1 \"A\" Road");
        assert_eq!(row.amount_cents, 180_000);
        assert_eq!(row.status, TransactionStatus::Failed);
    }

    #[test]
    fn import_prepends_in_file_order_with_new_ids() -> anyhow::Result<()> {
        let mut store = RecordStore::from_rows(vec![transaction("T-2000", "Existing")?])?;
        let first = transaction("T-1", "First")?;
        let second = transaction("T-2", "Second")?;
        let text = export_csv(&[&first, &second])?;

        let report = import_csv(&mut store, &text);

        assert!(report.skipped.is_empty());
        let customers: Vec<_> = store
            .list()
            .iter()
            .map(|row| row.customer.as_str())
            .collect();
        assert_eq!(customers, vec!["First", "Second", "Existing"]);
        assert_eq!(report.inserted[0].id.as_str(), "T-2001");
        assert_eq!(report.inserted[0].to_new(), first.to_new());
        Ok(())
    }

    #[test]
    fn every_layout_starts_with_id() {
        assert_eq!(Transaction::csv_columns()[0].header, "ID");
        assert_eq!(Agent::csv_columns()[0].header, "ID");
    }

    #[test]
    fn client_report_uses_report_headers_and_client_number() -> anyhow::Result<()> {
        let due = Date::from_calendar_date(2025, Month::July, 19)?;
        let installment = Installment::from_new(
            RowId::from("I-1003"),
            NewInstallment {
                client_id: RowId::from("C-1001"),
                label: "3rd Payment".to_owned(),
                due_date: due,
                amount_cents: 73_250,
                status: InstallmentStatus::Pending,
            },
        );
        let text = client_report_csv(&[&installment])?;
        assert_eq!(
            text,
            "\"Transaction ID\",\"Payment Type\",\"Due Date\",\"Amount\",\"Status\"\n\
             \"I-1003\",\"3rd Payment\",\"2025-07-19\",\"732.50\",\"Pending\""
        );

        let client = Client::from_new(
            RowId::from("C-1001"),
            NewClient {
                client_number: "32484".to_owned(),
                name: "James Smith".to_owned(),
                property_name: "Pine View Apartments".to_owned(),
                property_address: "123 Maple St".to_owned(),
                deal: DealType::Rent,
                amount_cents: 180_000,
                next_payment: due,
                status: ClientStatus::OnGoing,
            },
        );
        assert_eq!(client_report_file_name(&client), "client-32484-report.csv");
        Ok(())
    }

    #[test]
    fn installment_without_client_is_skipped() {
        let text = "h\nI-1,,Final Payment,2025-07-28,426,Paid";
        let parsed = parse_csv::<Installment>(text);
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.skipped.len(), 1);
    }

    #[test]
    fn file_name_and_mime() {
        assert_eq!(
            export_file_name(EntityKind::Transaction, "2025-07-08"),
            "transactions-2025-07-08.csv"
        );
        assert_eq!(CSV_MIME, "text/csv;charset=utf-8;");
    }
}
