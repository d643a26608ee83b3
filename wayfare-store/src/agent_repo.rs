use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use wayfare_core::agent::{Agent, AgentFilter, AgentStats, AgentUpdate, NewAgent};
use wayfare_core::pagination::PageRequest;
use wayfare_core::repository::AgentStore;
use wayfare_core::StoreResult;

use crate::backend;

pub struct PgAgentStore {
    pool: PgPool,
}

impl PgAgentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AgentRow {
    agent_id: Uuid,
    name: String,
    contact: String,
    email: String,
    commission_rate: f64,
    is_active: bool,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AgentRow> for Agent {
    fn from(row: AgentRow) -> Self {
        Agent {
            agent_id: row.agent_id,
            name: row.name,
            contact: row.contact,
            email: row.email,
            commission_rate: row.commission_rate,
            is_active: row.is_active,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AgentStatsRow {
    total_bookings: i64,
    confirmed_bookings: i64,
    total_revenue: Option<f64>,
}

const AGENT_COLUMNS: &str =
    "agent_id, name, contact, email, commission_rate, is_active, notes, created_at, updated_at";

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AgentFilter) {
    if let Some(is_active) = filter.is_active {
        builder.push(" AND is_active = ");
        builder.push_bind(is_active);
    }
    if let Some(search) = &filter.search {
        let term = format!("%{}%", search);
        builder.push(" AND (name ILIKE ");
        builder.push_bind(term.clone());
        builder.push(" OR email ILIKE ");
        builder.push_bind(term);
        builder.push(")");
    }
}

#[async_trait]
impl AgentStore for PgAgentStore {
    async fn find_by_id(&self, agent_id: Uuid) -> StoreResult<Option<Agent>> {
        let row = sqlx::query_as::<_, AgentRow>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE agent_id = $1"
        ))
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Agent::from))
    }

    async fn list(
        &self,
        filter: &AgentFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Agent>, i64)> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {AGENT_COLUMNS} FROM agents WHERE 1=1"));
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY name ASC LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let rows: Vec<AgentRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM agents WHERE 1=1");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        Ok((rows.into_iter().map(Agent::from).collect(), total))
    }

    async fn create(&self, agent: &NewAgent) -> StoreResult<Agent> {
        let row = sqlx::query_as::<_, AgentRow>(&format!(
            "INSERT INTO agents (agent_id, name, contact, email, commission_rate, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {AGENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&agent.name)
        .bind(&agent.contact)
        .bind(&agent.email)
        .bind(agent.commission_rate)
        .bind(&agent.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.into())
    }

    async fn update(&self, agent_id: Uuid, update: &AgentUpdate) -> StoreResult<Option<Agent>> {
        if update.name.is_none()
            && update.contact.is_none()
            && update.email.is_none()
            && update.commission_rate.is_none()
            && update.is_active.is_none()
            && update.notes.is_none()
        {
            return self.find_by_id(agent_id).await;
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE agents SET ");
        let mut sets = builder.separated(", ");
        if let Some(name) = &update.name {
            sets.push("name = ");
            sets.push_bind_unseparated(name);
        }
        if let Some(contact) = &update.contact {
            sets.push("contact = ");
            sets.push_bind_unseparated(contact);
        }
        if let Some(email) = &update.email {
            sets.push("email = ");
            sets.push_bind_unseparated(email);
        }
        if let Some(rate) = update.commission_rate {
            sets.push("commission_rate = ");
            sets.push_bind_unseparated(rate);
        }
        if let Some(is_active) = update.is_active {
            sets.push("is_active = ");
            sets.push_bind_unseparated(is_active);
        }
        if let Some(notes) = &update.notes {
            sets.push("notes = ");
            sets.push_bind_unseparated(notes);
        }
        sets.push("updated_at = NOW()");
        builder.push(" WHERE agent_id = ");
        builder.push_bind(agent_id);
        builder.push(format!(" RETURNING {AGENT_COLUMNS}"));

        let row: Option<AgentRow> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(row.map(Agent::from))
    }

    async fn stats(&self, agent_id: Uuid) -> StoreResult<AgentStats> {
        let row = sqlx::query_as::<_, AgentStatsRow>(
            "SELECT \
               COUNT(*) AS total_bookings, \
               COUNT(*) FILTER (WHERE status = 'confirmed') AS confirmed_bookings, \
               SUM(total_amount) AS total_revenue \
             FROM bookings WHERE agent_id = $1",
        )
        .bind(agent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(AgentStats {
            total_bookings: row.total_bookings,
            confirmed_bookings: row.confirmed_bookings,
            total_revenue: row.total_revenue.unwrap_or(0.0),
        })
    }

    async fn delete(&self, agent_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM agents WHERE agent_id = $1")
            .bind(agent_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}
