//! CLI entry point for inspecting and managing login sessions.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing_subscriber::{fmt, EnvFilter};

use acmidm_core::Claims;
use acmidm_graph::{GraphStore, MemoryStore, SparqlClient};

use acmidm_session::config::AppConfig;
use acmidm_session::SessionStore;

#[derive(Parser)]
#[command(name = "acmidm-session")]
#[command(about = "Account and session bookkeeping for the ACM/IDM login flow")]
struct Cli {
    /// Config file prefix (default: acmidm).
    #[arg(short, long, default_value = "acmidm", global = true)]
    config: String,

    /// Run against an empty in-memory store instead of the SPARQL endpoint.
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find or create the account for a set of claims.
    EnsureAccount(ClaimArgs),

    /// Look up a Bestuurseenheid by OVO code.
    Group {
        #[arg(long)]
        ovo: String,
    },

    /// Show the account a session is logged in with.
    Account {
        #[arg(long)]
        session: String,
    },

    /// Show the current session of an account.
    CurrentSession {
        #[arg(long)]
        account: String,
    },

    /// Log a session in: ensure the account, then replace the session.
    Login {
        #[arg(long)]
        session: String,

        #[arg(long)]
        ovo: String,

        #[command(flatten)]
        claims: ClaimArgs,
    },

    /// Remove a session.
    Logout {
        #[arg(long)]
        session: String,
    },
}

#[derive(Args)]
struct ClaimArgs {
    #[arg(long)]
    vo_id: String,

    #[arg(long, default_value = "")]
    given_name: String,

    #[arg(long, default_value = "")]
    family_name: String,

    /// National registry number.
    #[arg(long, default_value = "")]
    rrn: String,
}

impl From<ClaimArgs> for Claims {
    fn from(args: ClaimArgs) -> Self {
        Claims {
            vo_id: args.vo_id,
            given_name: args.given_name,
            family_name: args.family_name,
            rrn: args.rrn,
            extra: Default::default(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    let output = if cli.memory {
        tracing::info!("Using in-memory store");
        let store = SessionStore::new(MemoryStore::new(), config.store);
        execute(&store, cli.command).await?
    } else {
        let client = SparqlClient::new(&config.sparql.to_client_config())?;
        let store = SessionStore::new(client, config.store);
        execute(&store, cli.command).await?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn execute<G: GraphStore>(
    store: &SessionStore<G>,
    command: Command,
) -> anyhow::Result<serde_json::Value> {
    let value = match command {
        Command::EnsureAccount(claims) => {
            let account = store.ensure_user_and_account(&claims.into()).await?;
            serde_json::to_value(account)?
        }
        Command::Group { ovo } => {
            lookup_json(store.lookup_group_by_ovo_number(&ovo).await?, GROUP_FIELDS)?
        }
        Command::Account { session } => {
            lookup_json(store.lookup_account_by_session(&session).await?, ACCOUNT_FIELDS)?
        }
        Command::CurrentSession { account } => lookup_json(
            store.lookup_current_session(&account).await?,
            CURRENT_SESSION_FIELDS,
        )?,
        Command::Login {
            session,
            ovo,
            claims,
        } => {
            let account = store.ensure_user_and_account(&claims.into()).await?;
            let group = store
                .lookup_group_by_ovo_number(&ovo)
                .await?
                .ok_or_else(|| anyhow::anyhow!("No Bestuurseenheid with OVO code {ovo}"))?;

            store.remove_session(&session).await?;
            let new_session = store
                .insert_session_for_account(&account.account_uri, &session, &group.group_uri)
                .await?;

            json!({
                "account": account,
                "group": group,
                "session": new_session,
            })
        }
        Command::Logout { session } => {
            store.remove_current_session(&session).await?;
            json!({ "removed": session })
        }
    };
    Ok(value)
}

// ── Output ───────────────────────────────────────────────────────

const GROUP_FIELDS: &[&str] = &["groupUri", "groupId"];
const ACCOUNT_FIELDS: &[&str] = &["accountUri", "accountId"];
const CURRENT_SESSION_FIELDS: &[&str] = &["sessionUri", "sessionId", "groupUri", "groupId"];

/// A lookup result as JSON; a miss prints every field as `null`.
fn lookup_json<T: Serialize>(found: Option<T>, fields: &[&str]) -> serde_json::Result<Value> {
    match found {
        Some(value) => serde_json::to_value(value),
        None => Ok(Value::Object(
            fields
                .iter()
                .map(|field| (field.to_string(), Value::Null))
                .collect::<Map<String, Value>>(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use acmidm_core::{AccountRef, CurrentSession, GroupRef};

    use super::*;

    fn keys(value: &Value) -> Vec<String> {
        value.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn test_missing_group_prints_null_fields() {
        let value = lookup_json(None::<GroupRef>, GROUP_FIELDS).unwrap();
        assert_eq!(value, json!({ "groupUri": null, "groupId": null }));
    }

    #[test]
    fn test_missing_current_session_prints_null_fields() {
        let value = lookup_json(None::<CurrentSession>, CURRENT_SESSION_FIELDS).unwrap();
        assert_eq!(
            value,
            json!({ "sessionUri": null, "sessionId": null, "groupUri": null, "groupId": null })
        );
    }

    #[test]
    fn test_found_and_missing_shapes_share_keys() {
        let group = GroupRef {
            group_uri: "http://data.lblod.info/id/bestuurseenheden/1".to_string(),
            group_id: "1".to_string(),
        };
        let account = AccountRef {
            account_uri: "http://data.lblod.info/id/account/1".to_string(),
            account_id: "1".to_string(),
        };
        let current = CurrentSession {
            session_uri: "http://mu.semte.ch/sessions/1".to_string(),
            session_id: "s1".to_string(),
            group_uri: group.group_uri.clone(),
            group_id: group.group_id.clone(),
        };

        for (found, fields) in [
            (lookup_json(Some(group), GROUP_FIELDS).unwrap(), GROUP_FIELDS),
            (lookup_json(Some(account), ACCOUNT_FIELDS).unwrap(), ACCOUNT_FIELDS),
            (lookup_json(Some(current), CURRENT_SESSION_FIELDS).unwrap(), CURRENT_SESSION_FIELDS),
        ] {
            let missing = lookup_json(None::<GroupRef>, fields).unwrap();
            let mut expected = keys(&missing);
            let mut actual = keys(&found);
            expected.sort();
            actual.sort();
            assert_eq!(actual, expected);
        }
    }
}
