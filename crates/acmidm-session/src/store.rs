//! Session and identity bookkeeping against the triple store.
//!
//! Every operation is a single query or update scoped to the configured
//! graph. Lookups that find nothing return `None`; only store failures are
//! errors.

use chrono::Utc;

use acmidm_core::types::{AccountRef, Claims, CurrentSession, GroupRef, ResourceId, SessionRef};
use acmidm_core::vocab;
use acmidm_core::StoreConfig;
use acmidm_graph::{GraphStore, Iri, Literal, Select, Solution, Triple, TriplePattern, Update, Var};

use crate::error::Result;

const USER: Var = Var::new("user");
const PERSON_ID: Var = Var::new("personId");
const ACCOUNT: Var = Var::new("account");
const ACCOUNT_ID: Var = Var::new("accountId");
const SESSION: Var = Var::new("session");
const SESSION_ID: Var = Var::new("sessionId");
const GROUP: Var = Var::new("group");
const GROUP_ID: Var = Var::new("groupId");
const ID: Var = Var::new("id");
const MODIFIED: Var = Var::new("modified");

fn iri(value: &str) -> Iri {
    Iri::new(value)
}

fn rdf_type() -> Iri {
    iri(vocab::RDF_TYPE)
}

/// Reads and writes persons, accounts, and sessions for the login flow.
///
/// Clone is as cheap as cloning the underlying store.
#[derive(Debug, Clone)]
pub struct SessionStore<G> {
    store: G,
    config: StoreConfig,
    graph: Iri,
}

impl<G: GraphStore> SessionStore<G> {
    pub fn new(store: G, config: StoreConfig) -> Self {
        let graph = Iri::new(config.graph.clone());
        Self {
            store,
            config,
            graph,
        }
    }

    pub fn store(&self) -> &G {
        &self.store
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ── Sessions ─────────────────────────────────────────────────

    /// Delete the account, uuid, modified, and group triples of a session.
    ///
    /// Each predicate is removed independently, so a session missing some
    /// of them is still cleared completely.
    pub async fn remove_session(&self, session_uri: &str) -> Result<()> {
        let session = iri(session_uri);
        let update = Update::new()
            .prefixes(vocab::PREFIXES)
            .delete_where(
                self.graph.clone(),
                vec![TriplePattern::new(&session, iri(vocab::SESSION_ACCOUNT), ACCOUNT)],
            )
            .delete_where(
                self.graph.clone(),
                vec![TriplePattern::new(&session, iri(vocab::MU_UUID), ID)],
            )
            .delete_where(
                self.graph.clone(),
                vec![TriplePattern::new(&session, iri(vocab::DCTERMS_MODIFIED), MODIFIED)],
            )
            .delete_where(
                self.graph.clone(),
                vec![TriplePattern::new(&session, iri(vocab::SESSION_GROUP), GROUP)],
            );

        self.store.update(&update).await?;
        tracing::info!(session = %session_uri, "Session removed");
        Ok(())
    }

    /// Log out the session currently bound to `session_uri`.
    pub async fn remove_current_session(&self, session_uri: &str) -> Result<()> {
        self.remove_session(session_uri).await
    }

    /// Attach a new session to an account and group.
    ///
    /// The session URI is supplied by the caller; its id and modification
    /// time are generated here.
    pub async fn insert_session_for_account(
        &self,
        account_uri: &str,
        session_uri: &str,
        group_uri: &str,
    ) -> Result<SessionRef> {
        let session_id = ResourceId::new().to_string();
        let session = iri(session_uri);

        let update = Update::new().prefixes(vocab::PREFIXES).insert_data(
            self.graph.clone(),
            vec![
                Triple::new(session.clone(), vocab::MU_UUID, Literal::string(&session_id)),
                Triple::new(session.clone(), vocab::SESSION_ACCOUNT, iri(account_uri)),
                Triple::new(session.clone(), vocab::SESSION_GROUP, iri(group_uri)),
                Triple::new(session, vocab::DCTERMS_MODIFIED, Literal::date_time(Utc::now())),
            ],
        );

        self.store.update(&update).await?;
        tracing::info!(
            session = %session_uri,
            session_id = %session_id,
            account = %account_uri,
            group = %group_uri,
            "Session inserted"
        );

        Ok(SessionRef {
            session_uri: session_uri.to_string(),
            session_id,
        })
    }

    /// The session linked to `account_uri`, with its group.
    pub async fn lookup_current_session(&self, account_uri: &str) -> Result<Option<CurrentSession>> {
        let rows = self.store.select(&self.current_session_query(account_uri)).await?;
        let found = rows
            .first()
            .map(|row| -> Result<CurrentSession> {
                Ok(CurrentSession {
                    session_uri: row.require_value(SESSION.name())?.to_string(),
                    session_id: row.require_value(SESSION_ID.name())?.to_string(),
                    group_uri: row.require_value(GROUP.name())?.to_string(),
                    group_id: row.require_value(GROUP_ID.name())?.to_string(),
                })
            })
            .transpose()?;

        tracing::debug!(account = %account_uri, found = found.is_some(), "Current session lookup");
        Ok(found)
    }

    pub fn current_session_query(&self, account_uri: &str) -> Select {
        Select::new()
            .prefixes(vocab::PREFIXES)
            .var(SESSION)
            .var(SESSION_ID)
            .var(GROUP)
            .var(GROUP_ID)
            .from_graph(self.graph.clone())
            .pattern(SESSION, iri(vocab::SESSION_ACCOUNT), iri(account_uri))
            .pattern(SESSION, iri(vocab::MU_UUID), SESSION_ID)
            .pattern(SESSION, iri(vocab::SESSION_GROUP), GROUP)
            .pattern(GROUP, iri(vocab::MU_UUID), GROUP_ID)
    }

    // ── Accounts ─────────────────────────────────────────────────

    /// Find the account for `claims.vo_id`, creating person, identifier,
    /// and account together if there is none.
    ///
    /// The lookup and the insert are separate requests; two concurrent
    /// calls for an unseen `vo_id` can both insert.
    pub async fn ensure_user_and_account(&self, claims: &Claims) -> Result<AccountRef> {
        let rows = self.store.select(&self.account_by_vo_id_query(&claims.vo_id)).await?;

        match rows.first() {
            Some(row) => {
                let account = account_from_row(row)?;
                tracing::debug!(account = %account.account_uri, "Existing account found");
                Ok(account)
            }
            None => self.insert_user_and_account(claims).await,
        }
    }

    pub fn account_by_vo_id_query(&self, vo_id: &str) -> Select {
        Select::new()
            .prefixes(vocab::PREFIXES)
            .var(ACCOUNT)
            .var(ACCOUNT_ID)
            .from_graph(self.graph.clone())
            .pattern(USER, rdf_type(), iri(vocab::FOAF_PERSON))
            .pattern(USER, iri(vocab::MU_UUID), PERSON_ID)
            .pattern(USER, iri(vocab::FOAF_ACCOUNT), ACCOUNT)
            .pattern(ACCOUNT, rdf_type(), iri(vocab::FOAF_ONLINE_ACCOUNT))
            .pattern(ACCOUNT, iri(vocab::MU_UUID), ACCOUNT_ID)
            .pattern(ACCOUNT, iri(vocab::DCTERMS_IDENTIFIER), Literal::string(vo_id))
    }

    async fn insert_user_and_account(&self, claims: &Claims) -> Result<AccountRef> {
        let person_id = ResourceId::new();
        let person = iri(&person_id.uri_under(&self.config.person_base_uri));
        let account_id = ResourceId::new();
        let account = iri(&account_id.uri_under(&self.config.account_base_uri));
        let identifier_id = ResourceId::new();
        let identifier = iri(&identifier_id.uri_under(&self.config.identifier_base_uri));

        let triples = vec![
            Triple::new(person.clone(), vocab::RDF_TYPE, iri(vocab::FOAF_PERSON)),
            Triple::new(person.clone(), vocab::MU_UUID, Literal::string(person_id.to_string())),
            Triple::new(person.clone(), vocab::FOAF_FIRST_NAME, Literal::string(&claims.given_name)),
            Triple::new(person.clone(), vocab::FOAF_FAMILY_NAME, Literal::string(&claims.family_name)),
            Triple::new(person.clone(), vocab::ADMS_IDENTIFIER, identifier.clone()),
            Triple::new(person, vocab::FOAF_ACCOUNT, account.clone()),
            Triple::new(identifier.clone(), vocab::RDF_TYPE, iri(vocab::ADMS_IDENTIFIER_CLASS)),
            Triple::new(identifier.clone(), vocab::MU_UUID, Literal::string(identifier_id.to_string())),
            Triple::new(identifier, vocab::SKOS_NOTATION, Literal::string(&claims.rrn)),
            Triple::new(account.clone(), vocab::RDF_TYPE, iri(vocab::FOAF_ONLINE_ACCOUNT)),
            Triple::new(account.clone(), vocab::MU_UUID, Literal::string(account_id.to_string())),
            Triple::new(
                account.clone(),
                vocab::FOAF_ACCOUNT_SERVICE_HOMEPAGE,
                iri(&self.config.service_homepage),
            ),
            Triple::new(account.clone(), vocab::DCTERMS_IDENTIFIER, Literal::string(&claims.vo_id)),
            Triple::new(account.clone(), vocab::DCTERMS_CREATED, Literal::date_time(Utc::now())),
        ];

        let update = Update::new()
            .prefixes(vocab::PREFIXES)
            .insert_data(self.graph.clone(), triples);
        self.store.update(&update).await?;

        tracing::info!(
            account = %account.as_str(),
            account_id = %account_id,
            person_id = %person_id,
            "Created person and account"
        );

        Ok(AccountRef {
            account_uri: account.into_string(),
            account_id: account_id.to_string(),
        })
    }

    /// The account a session is logged in with.
    pub async fn lookup_account_by_session(&self, session_uri: &str) -> Result<Option<AccountRef>> {
        let rows = self.store.select(&self.account_by_session_query(session_uri)).await?;
        let found = rows.first().map(account_from_row).transpose()?;

        tracing::debug!(session = %session_uri, found = found.is_some(), "Account lookup by session");
        Ok(found)
    }

    pub fn account_by_session_query(&self, session_uri: &str) -> Select {
        Select::new()
            .prefixes(vocab::PREFIXES)
            .var(ACCOUNT)
            .var(ACCOUNT_ID)
            .from_graph(self.graph.clone())
            .pattern(iri(session_uri), iri(vocab::SESSION_ACCOUNT), ACCOUNT)
            .pattern(ACCOUNT, rdf_type(), iri(vocab::FOAF_ONLINE_ACCOUNT))
            .pattern(ACCOUNT, iri(vocab::MU_UUID), ACCOUNT_ID)
    }

    // ── Groups ───────────────────────────────────────────────────

    /// The Bestuurseenheid whose `dcterms:identifier` is `ovo_number`.
    pub async fn lookup_group_by_ovo_number(&self, ovo_number: &str) -> Result<Option<GroupRef>> {
        let rows = self.store.select(&self.group_by_ovo_number_query(ovo_number)).await?;
        let found = rows
            .first()
            .map(|row| -> Result<GroupRef> {
                Ok(GroupRef {
                    group_uri: row.require_value(GROUP.name())?.to_string(),
                    group_id: row.require_value(GROUP_ID.name())?.to_string(),
                })
            })
            .transpose()?;

        tracing::debug!(ovo = %ovo_number, found = found.is_some(), "Group lookup");
        Ok(found)
    }

    pub fn group_by_ovo_number_query(&self, ovo_number: &str) -> Select {
        Select::new()
            .prefixes(vocab::PREFIXES)
            .var(GROUP)
            .var(GROUP_ID)
            .from_graph(self.graph.clone())
            .pattern(GROUP, rdf_type(), iri(vocab::BESTUURSEENHEID))
            .pattern(GROUP, iri(vocab::MU_UUID), GROUP_ID)
            .pattern(GROUP, iri(vocab::DCTERMS_IDENTIFIER), Literal::string(ovo_number))
    }
}

fn account_from_row(row: &Solution) -> Result<AccountRef> {
    Ok(AccountRef {
        account_uri: row.require_value(ACCOUNT.name())?.to_string(),
        account_id: row.require_value(ACCOUNT_ID.name())?.to_string(),
    })
}
