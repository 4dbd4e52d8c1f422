use std::fmt::Write as _;
use std::io::Write as _;

use chrono::SecondsFormat;

use ledger_api::MessageRecord;
use ledger_engine::QueryService;

use crate::config::{AppConfig, ViewArgs};
use crate::error::ServerError;

const SEPARATOR: &str = "----------------------------------------";

pub async fn run(config: &AppConfig, args: ViewArgs) -> Result<(), ServerError> {
    let gateway = super::connect_store(config, config.query.timeout()).await?;
    let records = QueryService::new(gateway)
        .list(args.ledger_code.as_deref(), args.limit)
        .await?;

    if records.is_empty() {
        tracing::info!(collection = %config.mongo.collection, "no documents found");
        return Ok(());
    }
    tracing::info!(
        count = records.len(),
        collection = %config.mongo.collection,
        "found documents"
    );

    let mut out = std::io::stdout().lock();
    for record in &records {
        out.write_all(render_record(record).as_bytes())?;
    }
    writeln!(out, "{SEPARATOR}")?;
    Ok(())
}

fn render_record(record: &MessageRecord) -> String {
    let id = record.id.as_ref().map_or("-", |id| id.as_str());
    let mut block = String::new();
    let _ = writeln!(block, "{SEPARATOR}");
    let _ = writeln!(block, "  Message ID:   {id}");
    let _ = writeln!(block, "  Ledger Code:  {}", record.ledger_code);
    let _ = writeln!(block, "  Ledger Meter: {}", record.ledger_meter);
    let _ = writeln!(block, "  Raw Message:  {}", record.raw_message);
    let _ = writeln!(
        block,
        "  Received At:  {}",
        record.received_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    block
}
