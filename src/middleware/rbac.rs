// src/middleware/rbac.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::auth::RequestContext,
    models::auth::Role,
};

// O que se pode fazer com um recurso.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

// Sobre o que a ação incide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Product,
    Category,
    Supplier,
    StockMovement,
    User,
    Company,
    Setting,
    ActivityLog,
    BulkOperation,
}

/// Função PURA de decisão de acesso.
///
/// `resource_company` é a empresa dona do recurso alvo (None para recursos
/// de escopo de sistema, como as configurações globais). SuperAdmin passa
/// sempre; para os demais papéis, qualquer recurso de OUTRA empresa é
/// negado antes de olhar a matriz de papéis, leitura ou escrita.
pub fn allow(
    ctx: &RequestContext,
    action: Action,
    resource: Resource,
    resource_company: Option<Uuid>,
) -> bool {
    if ctx.role.is_super_admin() {
        return true;
    }

    if let Some(company_id) = resource_company {
        if company_id != ctx.company_id {
            return false;
        }
    }

    match action {
        // Dentro da própria empresa, leituras são liberadas para todos os
        // papéis (o escopo já foi verificado acima).
        Action::Read => !matches!(resource, Resource::BulkOperation),

        Action::Create | Action::Update | Action::Delete => match (ctx.role, resource) {
            // Admin não cria nem apaga empresas; só edita a própria.
            (Role::Admin, Resource::Company) => action == Action::Update,
            // Configuração de sistema (sem empresa) é exclusiva do SuperAdmin.
            (Role::Admin, Resource::Setting) => resource_company.is_some(),
            (Role::Admin, _) => true,

            // Manager opera o dia a dia, mas não gerencia usuários,
            // configurações nem ações em lote.
            (
                Role::Manager,
                Resource::Product
                | Resource::Category
                | Resource::Supplier
                | Resource::StockMovement,
            ) => true,

            // Employee só registra movimentações.
            (Role::Employee, Resource::StockMovement) => action == Action::Create,

            _ => false,
        },
    }
}

/// Variante que devolve `AccessDenied` pronta para o `?` dos handlers.
pub fn ensure(
    ctx: &RequestContext,
    action: Action,
    resource: Resource,
    resource_company: Option<Uuid>,
) -> Result<(), AppError> {
    if allow(ctx, action, resource, resource_company) {
        Ok(())
    } else {
        Err(AppError::AccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role, company: Uuid) -> RequestContext {
        RequestContext {
            user_id: Uuid::new_v4(),
            role,
            company_id: company,
        }
    }

    #[test]
    fn super_admin_ignora_escopo_de_empresa() {
        let company = Uuid::new_v4();
        let other = Uuid::new_v4();
        let sa = ctx(Role::SuperAdmin, company);
        assert!(allow(&sa, Action::Delete, Resource::Company, Some(other)));
        assert!(allow(&sa, Action::Update, Resource::Setting, None));
    }

    #[test]
    fn escrita_entre_empresas_e_negada_mesmo_para_admin() {
        let company = Uuid::new_v4();
        let other = Uuid::new_v4();
        let admin = ctx(Role::Admin, company);
        assert!(!allow(&admin, Action::Update, Resource::Product, Some(other)));
        assert!(!allow(&admin, Action::Read, Resource::Product, Some(other)));
        assert!(allow(&admin, Action::Update, Resource::Product, Some(company)));
    }

    #[test]
    fn employee_so_cria_movimentacoes() {
        let company = Uuid::new_v4();
        let emp = ctx(Role::Employee, company);
        assert!(allow(&emp, Action::Create, Resource::StockMovement, Some(company)));
        assert!(allow(&emp, Action::Read, Resource::Product, Some(company)));
        assert!(!allow(&emp, Action::Create, Resource::Product, Some(company)));
        assert!(!allow(&emp, Action::Delete, Resource::Supplier, Some(company)));
        assert!(!allow(&emp, Action::Create, Resource::BulkOperation, Some(company)));
    }

    #[test]
    fn manager_nao_escreve_configuracoes_nem_usuarios() {
        let company = Uuid::new_v4();
        let mgr = ctx(Role::Manager, company);
        assert!(allow(&mgr, Action::Update, Resource::Product, Some(company)));
        assert!(allow(&mgr, Action::Read, Resource::User, Some(company)));
        assert!(!allow(&mgr, Action::Create, Resource::User, Some(company)));
        assert!(!allow(&mgr, Action::Update, Resource::Setting, Some(company)));
        assert!(!allow(&mgr, Action::Create, Resource::BulkOperation, Some(company)));
    }

    #[test]
    fn configuracao_de_sistema_so_super_admin() {
        let company = Uuid::new_v4();
        assert!(!allow(&ctx(Role::Admin, company), Action::Update, Resource::Setting, None));
        assert!(allow(&ctx(Role::Admin, company), Action::Update, Resource::Setting, Some(company)));
        assert!(allow(&ctx(Role::SuperAdmin, company), Action::Update, Resource::Setting, None));
    }

    // Se um papel é permitido, todos os papéis acima dele também são; se é
    // negado, todos abaixo também são.
    #[test]
    fn decisao_e_monotonica_na_hierarquia() {
        let company = Uuid::new_v4();
        let roles = [Role::Employee, Role::Manager, Role::Admin, Role::SuperAdmin];
        let actions = [Action::Read, Action::Create, Action::Update, Action::Delete];
        let resources = [
            Resource::Product,
            Resource::Category,
            Resource::Supplier,
            Resource::StockMovement,
            Resource::User,
            Resource::Company,
            Resource::Setting,
            Resource::ActivityLog,
            Resource::BulkOperation,
        ];

        for action in actions {
            for resource in resources {
                for scope in [Some(company), None] {
                    let mut previous_allowed = false;
                    for role in roles {
                        let allowed = allow(&ctx(role, company), action, resource, scope);
                        assert!(
                            allowed || !previous_allowed,
                            "não-monotônico: {:?} {:?} {:?} escopo {:?}",
                            action, resource, role, scope
                        );
                        previous_allowed = allowed;
                    }
                }
            }
        }
    }
}
