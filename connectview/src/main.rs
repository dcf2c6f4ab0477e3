use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use connectview_api::ConnectApiImpl;
use connectview_core::{
    bootstrap::load_config,
    logging,
    models::{ActionRequest, ConnectorAction, ConnectorQuery, SortColumn, SortOrder},
};

#[derive(Parser, Debug)]
#[command(name = "connectview")]
#[command(about = "Kafka Connect clusters at a glance", long_about = None)]
struct Args {
    /// Config file (falls back to CONNECTVIEW_CONFIG_PATH, then ./config.yaml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Physical cluster to query (defaults to the first configured one)
    #[arg(long, global = true, env = "CONNECTVIEW_CLUSTER")]
    cluster: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the connect clusters of a cluster
    Connects {
        /// Include connector and task counters
        #[arg(long)]
        stats: bool,
    },
    /// Table of every connector across all connect clusters
    Connectors {
        /// Case-insensitive text matched against name, connect, state and type
        #[arg(long)]
        search: Option<String>,
        /// name, connect, type or status
        #[arg(long, default_value = "name")]
        order_by: SortColumn,
        #[arg(long)]
        desc: bool,
    },
    /// Connector names of one connect cluster
    Names { connect: String },
    /// Detail of one connector
    Show { connect: String, connector: String },
    /// Task records of one connector
    Tasks { connect: String, connector: String },
    /// Apply a lifecycle action (restart, restart-all-tasks, restart-failed-tasks, pause, stop, resume)
    Action {
        connect: String,
        connector: String,
        action: ConnectorAction,
        /// Restrict a restart to one task
        #[arg(long)]
        task: Option<u32>,
    },
    /// Restart a single task
    RestartTask {
        connect: String,
        connector: String,
        task: u32,
    },
    /// Installed connector plugins
    Plugins { connect: String },
    /// Reset the offsets of a stopped connector
    ResetOffsets { connect: String, connector: String },
    /// Delete a connector
    Delete { connect: String, connector: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.logging)?;

    let cluster = match args.cluster {
        Some(cluster) => cluster,
        None => config
            .clusters
            .first()
            .map(|c| c.name.clone())
            .context("No cluster configured")?,
    };
    debug!(cluster = %cluster, command = ?args.command, "Running command");

    let api = ConnectApiImpl::from_config(&config)?;
    run(&api, &cluster, args.command).await
}

async fn run(api: &ConnectApiImpl, cluster: &str, command: Command) -> Result<()> {
    match command {
        Command::Connects { stats } => print(&api.get_connects(cluster, stats).await?),
        Command::Connectors {
            search,
            order_by,
            desc,
        } => {
            let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
            let mut query = ConnectorQuery::default().ordered_by(order_by, order);
            query.search = search;
            print(&api.get_all_connectors(cluster, &query).await?)
        }
        Command::Names { connect } => print(&api.get_connector_names(cluster, &connect).await?),
        Command::Show { connect, connector } => {
            print(&api.get_connector(cluster, &connect, &connector).await?)
        }
        Command::Tasks { connect, connector } => {
            print(&api.get_connector_tasks(cluster, &connect, &connector).await?)
        }
        Command::Action {
            connect,
            connector,
            action,
            task,
        } => {
            let mut request = ActionRequest::new(connect, connector, action);
            request.task_id = task;
            api.update_connector_state(cluster, &request).await?;
            Ok(())
        }
        Command::RestartTask {
            connect,
            connector,
            task,
        } => {
            api.restart_connector_task(cluster, &connect, &connector, task)
                .await?;
            Ok(())
        }
        Command::Plugins { connect } => print(&api.get_connector_plugins(cluster, &connect).await?),
        Command::ResetOffsets { connect, connector } => {
            api.reset_connector_offsets(cluster, &connect, &connector)
                .await?;
            Ok(())
        }
        Command::Delete { connect, connector } => {
            api.delete_connector(cluster, &connect, &connector).await?;
            Ok(())
        }
    }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
