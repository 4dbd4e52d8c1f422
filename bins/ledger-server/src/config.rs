use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use ledger_bus::NatsConfig;
use ledger_engine::{IngestConfig, QueryConfig};
use ledger_store::MongoConfig;

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "ledger-server", about = "Ledger message ingestion and lookup")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Подписаться на bus и сохранять принятые сообщения
    Subscribe(SubscribeArgs),
    /// Запустить web front end (store / inquiry / delete)
    Serve(ServeArgs),
    /// Вывести сохранённые записи, новые первыми
    View(ViewArgs),
    /// Удалить все записи с указанным ledger code
    Delete(DeleteArgs),
    /// Опубликовать каждую непустую строку файла в subject
    Publish(PublishArgs),
}

/// Настройки подключения, общие для всех подкоманд. Каждая перекрывает
/// соответствующее значение из config файла.
#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Путь к TOML конфиг файлу
    #[arg(long, global = true, default_value = "config.toml", env = "LEDGER_CONFIG")]
    pub config: String,

    #[arg(long, global = true, env = "NATS_URL")]
    pub nats_url: Option<String>,

    #[arg(long, global = true, env = "NATS_SUBJECT")]
    pub nats_subject: Option<String>,

    #[arg(long, global = true, env = "MONGO_URI")]
    pub mongo_uri: Option<String>,

    #[arg(long, global = true, env = "MONGO_DATABASE")]
    pub mongo_database: Option<String>,

    #[arg(long, global = true, env = "MONGO_COLLECTION")]
    pub mongo_collection: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct SubscribeArgs {
    /// Остановиться через столько секунд без сообщений
    #[arg(long)]
    pub idle_timeout: Option<u64>,
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// HTTP порт (по умолчанию из [web] port)
    #[arg(long, env = "WEB_PORT")]
    pub port: Option<u16>,
}

#[derive(Args, Clone, Debug)]
pub struct ViewArgs {
    /// Только записи с этим ledger code
    #[arg(long, allow_negative_numbers = true)]
    pub ledger_code: Option<String>,

    /// Не больше стольких записей
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Clone, Debug)]
pub struct DeleteArgs {
    #[arg(allow_negative_numbers = true)]
    pub ledger_code: String,
}

#[derive(Args, Clone, Debug)]
pub struct PublishArgs {
    /// Одно сообщение на строку, пустые строки пропускаются
    #[arg(long, default_value = "input.txt")]
    pub file: String,

    /// Пауза после каждой опубликованной строки
    #[arg(long, default_value_t = 200)]
    pub interval_ms: u64,
}

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

fn default_web_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_web_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
        }
    }
}

/// Итоговая конфигурация: defaults < config файл < env/CLI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub mongo: MongoConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

impl AppConfig {
    /// Нет файла: defaults. Нечитаемый или невалидный файл это ошибка.
    pub fn load(args: &GlobalArgs) -> Result<Self, ServerError> {
        let mut config = match Self::load_file(&args.config) {
            Ok(c) => {
                tracing::info!(config = %args.config, "loaded config");
                c
            }
            Err(e) => {
                if std::path::Path::new(&args.config).exists() {
                    return Err(e);
                }
                tracing::debug!(config = %args.config, "no config file, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(args);
        Ok(config)
    }

    pub fn load_file(path: &str) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path).map_err(|e| ServerError::Config {
            context: "read",
            detail: format!("{path}: {e}"),
        })?;
        Self::parse(&content).map_err(|e| match e {
            ServerError::Config { context, detail } => ServerError::Config {
                context,
                detail: format!("{path}: {detail}"),
            },
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self, ServerError> {
        toml::from_str(content).map_err(|e| ServerError::Config {
            context: "parse",
            detail: e.to_string(),
        })
    }

    pub fn apply_overrides(&mut self, args: &GlobalArgs) {
        if let Some(url) = &args.nats_url {
            self.nats.url = url.clone();
        }
        if let Some(subject) = &args.nats_subject {
            self.nats.subject = subject.clone();
        }
        if let Some(uri) = &args.mongo_uri {
            self.mongo.uri = uri.clone();
        }
        if let Some(database) = &args.mongo_database {
            self.mongo.database = database.clone();
        }
        if let Some(collection) = &args.mongo_collection {
            self.mongo.collection = collection.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args() -> GlobalArgs {
        GlobalArgs {
            config: "does-not-exist.toml".into(),
            nats_url: None,
            nats_subject: None,
            mongo_uri: None,
            mongo_database: None,
            mongo_collection: None,
        }
    }

    #[test]
    fn missing_file_means_defaults() {
        let config = AppConfig::load(&args()).unwrap();
        assert_eq!(config.nats.url, "nats://127.0.0.1:4222");
        assert_eq!(config.nats.subject, "updates");
        assert_eq!(config.mongo.uri, "mongodb://localhost:27017");
        assert_eq!(config.mongo.database, "nats_data");
        assert_eq!(config.mongo.collection, "messages");
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.ingest.blocked_ledger_code, 123);
        assert_eq!(config.ingest.insert_timeout_ms, 5_000);
        assert_eq!(config.ingest.idle_timeout_secs, None);
        assert_eq!(config.query.timeout_ms, 15_000);
    }

    #[test]
    fn file_values_fill_partial_sections() {
        let config = AppConfig::parse(
            r#"
            [nats]
            subject = "messages"

            [mongo]
            database = "messagedb"

            [ingest]
            blocked_ledger_code = 7
            idle_timeout_secs = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.nats.subject, "messages");
        assert_eq!(config.nats.url, "nats://127.0.0.1:4222");
        assert_eq!(config.mongo.database, "messagedb");
        assert_eq!(config.mongo.collection, "messages");
        assert_eq!(config.ingest.blocked_ledger_code, 7);
        assert_eq!(config.ingest.insert_timeout_ms, 5_000);
        assert_eq!(
            config.ingest.idle_timeout(),
            Some(std::time::Duration::from_secs(20))
        );
    }

    #[test]
    fn env_and_cli_override_the_file() {
        let mut config = AppConfig::parse(
            r#"
            [nats]
            url = "nats://file:4222"
            subject = "from-file"

            [mongo]
            uri = "mongodb://file:27017"
            "#,
        )
        .unwrap();
        let overrides = GlobalArgs {
            nats_subject: Some("from-env".into()),
            mongo_collection: Some("ledger".into()),
            ..args()
        };
        config.apply_overrides(&overrides);

        assert_eq!(config.nats.url, "nats://file:4222");
        assert_eq!(config.nats.subject, "from-env");
        assert_eq!(config.mongo.uri, "mongodb://file:27017");
        assert_eq!(config.mongo.collection, "ledger");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = AppConfig::parse("[nats\nurl = 1").unwrap_err();
        assert!(matches!(err, ServerError::Config { context: "parse", .. }));
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "ledger-server",
            "--nats-subject",
            "ticks",
            "view",
            "--ledger-code",
            "45",
            "--limit",
            "10",
        ])
        .unwrap();
        assert_eq!(cli.global.nats_subject.as_deref(), Some("ticks"));
        match cli.command {
            Commands::View(view) => {
                assert_eq!(view.ledger_code.as_deref(), Some("45"));
                assert_eq!(view.limit, Some(10));
            }
            _ => panic!("expected view"),
        }

        let cli = Cli::try_parse_from(["ledger-server", "delete", "123"]).unwrap();
        assert!(matches!(cli.command, Commands::Delete(DeleteArgs { ref ledger_code }) if ledger_code == "123"));
    }

    #[test]
    fn negative_ledger_codes_are_values_not_flags() {
        let cli = Cli::try_parse_from(["ledger-server", "delete", "-5"]).unwrap();
        assert!(matches!(cli.command, Commands::Delete(DeleteArgs { ref ledger_code }) if ledger_code == "-5"));

        let cli = Cli::try_parse_from(["ledger-server", "view", "--ledger-code", "-5"]).unwrap();
        match cli.command {
            Commands::View(view) => assert_eq!(view.ledger_code.as_deref(), Some("-5")),
            _ => panic!("expected view"),
        }
    }
}
