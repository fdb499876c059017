//! Command execution.
//!
//! Every mutating command becomes a one-action [`Transaction`] applied through
//! [`Ramdisk::execute`], so the CLI exercises the same path as any other
//! caller.

use std::{fs, path::Path, sync::Arc};

use ramdisk_state::{InMemoryRegistry, Ramdisk};
use ramdisk_store::{Database, DatabaseConfig, FileBackend};
use ramdisk_types::{Action, Name, Node, Transaction, config::RamdiskConfig};
use serde_json::{Value, json};
use snafu::ResultExt;
use tracing::{debug, info};

use crate::{
    cli::{Cli, Command, ConfigAction, NodeData},
    error::{
        ConfigSnafu, ContractSnafu, CreateDataDirSnafu, InvalidHexSnafu, OpenSnafu, ReadFileSnafu,
        RegistrySnafu, RenderSnafu, Result,
    },
};

/// Command output.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// A JSON document.
    Json(Value),
    /// Preformatted text.
    Text(String),
}

type Service = Ramdisk<FileBackend, InMemoryRegistry>;

/// Runs a parsed command line.
///
/// # Errors
///
/// Returns a [`crate::CliError`] if inputs cannot be loaded, the database
/// cannot be opened, or the contract rejects the operation.
pub fn run(cli: &Cli) -> Result<Output> {
    match &cli.command {
        Command::Claim { claimant, volume } => {
            mutate(cli, Action::Claim { claimant: *claimant, volume: *volume })
        },
        Command::Reset { owner, volume } => {
            mutate(cli, Action::Reset { owner: *owner, volume: *volume })
        },
        Command::Delete { owner, volume } => {
            mutate(cli, Action::Delete { owner: *owner, volume: *volume })
        },
        Command::Freeze { owner, volume } => {
            mutate(cli, Action::Freeze { owner: *owner, volume: *volume })
        },
        Command::SetNode { owner, volume, id, data } => {
            let data = read_node_data(data)?;
            mutate(cli, Action::SetNode { owner: *owner, volume: *volume, id: *id, data })
        },
        Command::DeleteNode { owner, volume, id } => {
            mutate(cli, Action::DeleteNode { owner: *owner, volume: *volume, id: *id })
        },
        Command::DeleteRange { owner, volume, start, end } => mutate(
            cli,
            Action::DeleteRange { owner: *owner, volume: *volume, start: *start, end: *end },
        ),
        Command::DeleteContiguous { owner, volume, start, count } => mutate(
            cli,
            Action::DeleteContiguous { owner: *owner, volume: *volume, start: *start, count: *count },
        ),
        Command::Show { volume } => show(&open(cli)?, *volume).map(Output::Json),
        Command::GetNode { volume, id } => {
            let node = open(cli)?.node(*volume, *id).context(ContractSnafu)?;
            Ok(Output::Json(node.map_or(Value::Null, |node| node_json(&node))))
        },
        Command::ListNodes { volume, start_after, limit } => {
            let nodes =
                open(cli)?.list_nodes(*volume, *start_after, *limit).context(ContractSnafu)?;
            Ok(Output::Json(Value::Array(nodes.iter().map(node_json).collect())))
        },
        Command::Stats => Ok(Output::Json(stats(&open(cli)?))),
        Command::Config { action } => config_command(*action),
    }
}

/// Opens the service described by the global flags.
fn open(cli: &Cli) -> Result<Service> {
    let config = load_config(cli.config.as_deref())?;
    let registry = load_registry(cli.registry.as_deref())?;
    open_service(&cli.data, config, registry)
}

/// Executes one action as a transaction.
///
/// Without `--auth`, the acting account authorizes its own action.
fn mutate(cli: &Cli, action: Action) -> Result<Output> {
    let ramdisk = open(cli)?;
    let authorizations =
        if cli.auth.is_empty() { vec![action.actor()] } else { cli.auth.clone() };
    let kind = action.kind();
    let tx = Transaction::new(authorizations).with_action(action);

    let outcomes = ramdisk.execute(&tx).context(ContractSnafu)?;
    let outcome = serde_json::to_value(outcomes.first()).context(RenderSnafu)?;
    Ok(Output::Json(json!({ "action": kind, "outcome": outcome })))
}

fn show(ramdisk: &Service, volume: Name) -> Result<Value> {
    let Some(record) = ramdisk.volume(volume).context(ContractSnafu)? else {
        return Ok(Value::Null);
    };
    let usage = ramdisk.volume_usage(volume).context(ContractSnafu)?.unwrap_or_default();
    Ok(json!({
        "name": record.name,
        "owner": record.owner.account(),
        "frozen": record.owner.is_frozen(),
        "payer": record.payer,
        "node_count": usage.node_count,
        "data_bytes": usage.data_bytes,
    }))
}

fn node_json(node: &Node) -> Value {
    json!({ "id": node.id, "payer": node.payer, "data": hex::encode(&node.data) })
}

fn stats(ramdisk: &Service) -> Value {
    let stats = ramdisk.db().stats();
    json!({
        "path": ramdisk.db().backend().path().display().to_string(),
        "snapshot_id": stats.snapshot_id.raw(),
        "volumes": stats.volume_entries,
        "nodes": stats.node_entries,
        "snapshot_bytes": stats.snapshot_bytes,
    })
}

fn config_command(action: ConfigAction) -> Result<Output> {
    match action {
        ConfigAction::Schema => {
            let schema = schemars::schema_for!(RamdiskConfig);
            Ok(Output::Json(serde_json::to_value(schema).context(RenderSnafu)?))
        },
        ConfigAction::Example => {
            Ok(Output::Text(RamdiskConfig::default().to_toml_string().context(ConfigSnafu)?))
        },
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).context(ReadFileSnafu { path })
}

/// Loads the configuration file, or defaults when none is given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<RamdiskConfig> {
    let Some(path) = path else {
        return Ok(RamdiskConfig::default());
    };
    let text = fs::read_to_string(path).context(ReadFileSnafu { path })?;
    RamdiskConfig::from_toml_str(&text).context(ConfigSnafu)
}

/// Loads the registry fixture, or an empty registry when none is given.
pub(crate) fn load_registry(path: Option<&Path>) -> Result<InMemoryRegistry> {
    let Some(path) = path else {
        return Ok(InMemoryRegistry::new());
    };
    let text = fs::read_to_string(path).context(ReadFileSnafu { path })?;
    let registry: InMemoryRegistry = toml::from_str(&text).context(RegistrySnafu { path })?;
    debug!(
        bids = registry.bid_count(),
        accounts = registry.account_count(),
        "Loaded registry fixture"
    );
    Ok(registry)
}

fn read_node_data(data: &NodeData) -> Result<Vec<u8>> {
    match (&data.hex, &data.file) {
        (Some(text), _) => hex::decode(text.trim()).context(InvalidHexSnafu),
        (None, Some(path)) => read_file(path),
        (None, None) => Ok(Vec::new()),
    }
}

fn open_service(data_dir: &Path, config: RamdiskConfig, registry: InMemoryRegistry) -> Result<Service> {
    fs::create_dir_all(data_dir).context(CreateDataDirSnafu { path: data_dir })?;
    let path = data_dir.join(&config.storage.file_name);
    let db_config = DatabaseConfig::builder().sync_on_commit(config.storage.sync_on_commit).build();
    let db = Database::open_with_config(&path, db_config).context(OpenSnafu { path: &path })?;
    info!(path = %path.display(), "Opened database");

    Ok(Ramdisk::builder().db(Arc::new(db)).registry(registry).limits(config.limits).build())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use clap::Parser;
    use ramdisk_test_utils::TestDir;
    use ramdisk_types::ErrorCode;

    use super::*;

    fn run_args(dir: &TestDir, args: &[&str]) -> Result<Output> {
        let data = dir.path().to_str().unwrap();
        let mut argv = vec!["ramdisk", "--data", data];
        argv.extend_from_slice(args);
        run(&Cli::try_parse_from(argv).unwrap())
    }

    fn json(output: Output) -> Value {
        match output {
            Output::Json(value) => value,
            Output::Text(text) => panic!("expected JSON, got {text}"),
        }
    }

    #[test]
    fn test_claim_and_show() {
        let dir = TestDir::new();
        let out = json(run_args(&dir, &["claim", "alice", "alice"]).unwrap());
        assert_eq!(out["action"], "claim");
        assert_eq!(out["outcome"]["claimed"]["basis"], "own_name");

        let shown = json(run_args(&dir, &["show", "alice"]).unwrap());
        assert_eq!(shown["owner"], "alice");
        assert_eq!(shown["frozen"], false);
        assert_eq!(shown["node_count"], 0);
    }

    #[test]
    fn test_set_and_get_node_hex() {
        let dir = TestDir::new();
        run_args(&dir, &["claim", "alice", "alice"]).unwrap();
        let out = json(run_args(&dir, &["set-node", "alice", "alice", "7", "--hex", "cafe"]).unwrap());
        assert_eq!(out["outcome"]["node_set"]["created"], true);

        let node = json(run_args(&dir, &["get-node", "alice", "7"]).unwrap());
        assert_eq!(node["data"], "cafe");
        assert_eq!(node["payer"], "alice");

        let missing = json(run_args(&dir, &["get-node", "alice", "8"]).unwrap());
        assert_eq!(missing, Value::Null);
    }

    #[test]
    fn test_set_node_from_file() {
        let dir = TestDir::new();
        let file = dir.write("payload.bin", [0u8, 1, 2]);
        run_args(&dir, &["claim", "alice", "alice"]).unwrap();
        run_args(&dir, &["set-node", "alice", "alice", "1", "--file", file.to_str().unwrap()])
            .unwrap();

        let nodes = json(run_args(&dir, &["list-nodes", "alice"]).unwrap());
        assert_eq!(nodes[0]["data"], "000102");
    }

    #[test]
    fn test_bad_hex_is_rejected() {
        let dir = TestDir::new();
        run_args(&dir, &["claim", "alice", "alice"]).unwrap();
        let err = run_args(&dir, &["set-node", "alice", "alice", "1", "--hex", "xyz"]).unwrap_err();
        assert!(matches!(err, crate::CliError::InvalidHex { .. }));
        assert_eq!(err.error_code(), None);
    }

    #[test]
    fn test_auth_flag_replaces_default_authority() {
        let dir = TestDir::new();
        let err = run_args(&dir, &["claim", "alice", "alice", "--auth", "bob"]).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::MissingAuthority));
        assert!(json(run_args(&dir, &["show", "alice"]).unwrap()).is_null());
    }

    #[test]
    fn test_config_example_parses_back() {
        let dir = TestDir::new();
        let Output::Text(text) = run_args(&dir, &["config", "example"]).unwrap() else {
            panic!("expected text");
        };
        assert_eq!(RamdiskConfig::from_toml_str(&text).unwrap(), RamdiskConfig::default());
    }

    #[test]
    fn test_config_schema_lists_sections() {
        let dir = TestDir::new();
        let schema = json(run_args(&dir, &["config", "schema"]).unwrap());
        assert!(schema["properties"]["limits"].is_object());
        assert!(schema["properties"]["storage"].is_object());
    }

    #[test]
    fn test_config_file_limits_apply() {
        let dir = TestDir::new();
        let config = dir.write("ramdisk.toml", "[limits]\nmax_node_bytes = 2\n");
        let config = config.to_str().unwrap();

        run_args(&dir, &["--config", config, "claim", "alice", "alice"]).unwrap();
        let err = run_args(&dir, &["--config", config, "set-node", "alice", "alice", "1", "--hex", "000000"])
            .unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::InvalidArgument));
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = TestDir::new();
        let config = dir.write("bad.toml", "[limits]\nmax_node_bytes = 0\n");
        let err = run_args(&dir, &["--config", config.to_str().unwrap(), "stats"]).unwrap_err();
        assert!(matches!(err, crate::CliError::Config { .. }));
    }
}
