use ledger_engine::QueryService;

use crate::config::{AppConfig, DeleteArgs};
use crate::error::ServerError;

pub async fn run(config: &AppConfig, args: DeleteArgs) -> Result<(), ServerError> {
    // Проверка до подключения: опечатка падает сразу.
    ledger_engine::parse_ledger_code(&args.ledger_code)?;

    let gateway = super::connect_store(config, config.query.timeout()).await?;
    let summary = QueryService::new(gateway).delete(&args.ledger_code).await?;

    if summary.deleted_count == 0 {
        tracing::info!(ledger_code = summary.ledger_code, "no documents matched");
    }
    println!(
        "deleted {} document(s) with ledger_code {}",
        summary.deleted_count, summary.ledger_code
    );
    Ok(())
}
