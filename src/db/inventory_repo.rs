// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{Category, Product, Supplier},
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Produtos
    // ---
    // Leituras simples usam a pool principal; as buscas pontuais aceitam
    // executor para rodarem dentro de transações.

    pub async fn list_products(&self, scope: Option<Uuid>) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY name ASC",
        )
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn find_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        category_id: Option<Uuid>,
        supplier_id: Option<Uuid>,
        name: &str,
        sku: &str,
        price: Decimal,
        stock: i32,
        min_stock: i32,
        image_url: Option<&str>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (company_id, category_id, supplier_id, name, sku, price, stock, min_stock, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(category_id)
        .bind(supplier_id)
        .bind(name)
        .bind(sku)
        .bind(price)
        .bind(stock)
        .bind(min_stock)
        .bind(image_url)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::SkuAlreadyExists;
                }
            }
            e.into()
        })
    }

    // O UPDATE não toca em `stock`: saldo só muda pelo razão (movimentações)
    // ou pelos caminhos administrativos (zero-stock, reconciliação).
    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
        category_id: Option<Uuid>,
        supplier_id: Option<Uuid>,
        name: &str,
        sku: &str,
        price: Decimal,
        min_stock: i32,
        image_url: Option<&str>,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET category_id = $3, supplier_id = $4, name = $5, sku = $6,
                price = $7, min_stock = $8, image_url = $9, updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope)
        .bind(category_id)
        .bind(supplier_id)
        .bind(name)
        .bind(sku)
        .bind(price)
        .bind(min_stock)
        .bind(image_url)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::SkuAlreadyExists;
                }
            }
            AppError::from(e)
        })?;
        Ok(product)
    }

    pub async fn delete_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = sqlx::query_as::<_, Product>(
            "DELETE FROM products WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2) RETURNING *",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(executor)
        .await?;
        Ok(deleted)
    }

    // ---
    // Categorias
    // ---

    pub async fn list_categories(&self, scope: Option<Uuid>) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY name ASC",
        )
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn find_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (company_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn update_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $3, description = $4, updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope)
        .bind(name)
        .bind(description)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    pub async fn delete_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = sqlx::query_as::<_, Category>(
            "DELETE FROM categories WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2) RETURNING *",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(executor)
        .await?;
        Ok(deleted)
    }

    // ---
    // Fornecedores
    // ---

    pub async fn list_suppliers(&self, scope: Option<Uuid>) -> Result<Vec<Supplier>, AppError> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY name ASC",
        )
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;
        Ok(suppliers)
    }

    pub async fn find_supplier<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(executor)
        .await?;
        Ok(supplier)
    }

    pub async fn create_supplier<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (company_id, name, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .fetch_one(executor)
        .await?;
        Ok(supplier)
    }

    pub async fn update_supplier<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $3, email = $4, phone = $5, address = $6, updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .fetch_optional(executor)
        .await?;
        Ok(supplier)
    }

    pub async fn delete_supplier<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = sqlx::query_as::<_, Supplier>(
            "DELETE FROM suppliers WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2) RETURNING *",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(executor)
        .await?;
        Ok(deleted)
    }

    // ---
    // Seleções e mutações em lote (sempre escopadas NA MESMA instrução)
    // ---

    pub async fn products_in_categories<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE company_id = $1 AND category_id = ANY($2) ORDER BY name ASC",
        )
        .bind(company_id)
        .bind(category_ids)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    pub async fn zero_stock_by_categories<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products SET stock = 0, updated_at = NOW()
            WHERE company_id = $1 AND category_id = ANY($2)
            "#,
        )
        .bind(company_id)
        .bind(category_ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_products_by_categories<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM products WHERE company_id = $1 AND category_id = ANY($2)",
        )
        .bind(company_id)
        .bind(category_ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    // Ids que não casam com a empresa são silenciosamente excluídos da
    // contagem, nunca atualizados.
    pub async fn change_category<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_ids: &[Uuid],
        target_category_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products SET category_id = $3, updated_at = NOW()
            WHERE company_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(company_id)
        .bind(product_ids)
        .bind(target_category_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn update_product_image<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
        image_url: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products SET image_url = $3, updated_at = NOW()
            WHERE company_id = $1 AND id = $2
            "#,
        )
        .bind(company_id)
        .bind(product_id)
        .bind(image_url)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
