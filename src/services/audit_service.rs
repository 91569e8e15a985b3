// src/services/audit_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AuditRepository,
    middleware::auth::{ClientMeta, RequestContext},
    models::audit::{ActivityLog, AuditAction, AuditFilter},
};

// O Gravador de Auditoria. Contrato de escrita: exatamente UM registro
// por mutação bem-sucedida, gravado dentro da mesma transação da mutação
// sempre que há uma; nunca para leituras nem requisições rejeitadas.
#[derive(Clone)]
pub struct AuditService {
    audit_repo: AuditRepository,
}

impl AuditService {
    pub fn new(audit_repo: AuditRepository) -> Self {
        Self { audit_repo }
    }

    /// Grava o snapshot de uma mutação. `old_data` é None para Insert,
    /// `new_data` é None para Delete; ambos presentes no Update. Os
    /// snapshots usam o documento EXTERNO da entidade (camelCase), para
    /// continuarem legíveis mesmo após evolução do schema.
    #[allow(clippy::too_many_arguments)]
    pub async fn record<'e, E>(
        &self,
        executor: E,
        ctx: &RequestContext,
        meta: &ClientMeta,
        action: AuditAction,
        entity_type: &str,
        entity_id: Option<Uuid>,
        old_data: Option<serde_json::Value>,
        new_data: Option<serde_json::Value>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.audit_repo
            .insert(
                executor,
                ctx.user_id,
                ctx.company_id,
                action,
                entity_type,
                entity_id,
                old_data,
                new_data,
                meta.ip_address.as_deref(),
                meta.user_agent.as_deref(),
            )
            .await
    }

    /// Consulta com filtros. Quem não é SuperAdmin enxerga apenas a
    /// própria empresa: o filtro de empresa é FORÇADO aqui, antes de
    /// montar a query, independente do que veio na requisição.
    pub async fn query(
        &self,
        ctx: &RequestContext,
        mut filter: AuditFilter,
    ) -> Result<Vec<ActivityLog>, AppError> {
        if !ctx.role.is_super_admin() {
            filter.company_id = Some(ctx.company_id);
            // Filtros além do próprio escopo são exclusivos do SuperAdmin.
            filter.from = None;
            filter.to = None;
            filter.user_id = None;
            filter.action = None;
            filter.entity_type = None;
        }
        self.audit_repo.query(&filter).await
    }
}
