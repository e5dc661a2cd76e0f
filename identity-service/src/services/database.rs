//! PostgreSQL implementation of the repository.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use super::error::ServiceError;
use super::repository::Repository;
use crate::models::{Admin, Blog, BlogStatus, Company, User};

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for Database {
    async fn health_check(&self) -> Result<(), ServiceError> {
        crate::db::health_check(&self.pool).await.map_err(|e| {
            tracing::error!("Database health check failed: {}", e);
            ServiceError::from(e)
        })
    }

    // ==================== Admin Operations ====================

    async fn insert_admin(&self, admin: &Admin) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO admins (admin_id, username, email, password_hash, role_code, is_active,
                                can_create, can_read, can_update, can_delete,
                                last_login_utc, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(admin.admin_id)
        .bind(&admin.username)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(&admin.role_code)
        .bind(admin.is_active)
        .bind(admin.can_create)
        .bind(admin.can_read)
        .bind(admin.can_update)
        .bind(admin.can_delete)
        .bind(admin.last_login_utc)
        .bind(admin.created_utc)
        .bind(admin.updated_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_admin_by_id(&self, admin_id: Uuid) -> Result<Option<Admin>, ServiceError> {
        Ok(
            sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE admin_id = $1")
                .bind(admin_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, ServiceError> {
        Ok(
            sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, ServiceError> {
        Ok(
            sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_admins(&self) -> Result<Vec<Admin>, ServiceError> {
        Ok(
            sqlx::query_as::<_, Admin>("SELECT * FROM admins ORDER BY created_utc")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn update_admin(&self, admin: &Admin) -> Result<(), ServiceError> {
        let result = sqlx::query(
            r#"
            UPDATE admins
            SET role_code = $2, is_active = $3, can_create = $4, can_read = $5,
                can_update = $6, can_delete = $7, last_login_utc = $8,
                password_hash = $9, updated_utc = $10
            WHERE admin_id = $1
            "#,
        )
        .bind(admin.admin_id)
        .bind(&admin.role_code)
        .bind(admin.is_active)
        .bind(admin.can_create)
        .bind(admin.can_read)
        .bind(admin.can_update)
        .bind(admin.can_delete)
        .bind(admin.last_login_utc)
        .bind(&admin.password_hash)
        .bind(admin.updated_utc)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("Admin not found".to_string()));
        }
        Ok(())
    }

    // ==================== User Operations ====================

    async fn insert_user(&self, user: &User) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, firstname, lastname, email, password_hash, pin_hash,
                               user_type_code, is_verified, last_login_utc, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.pin_hash)
        .bind(&user.user_type_code)
        .bind(user.is_verified)
        .bind(user.last_login_utc)
        .bind(user.created_utc)
        .bind(user.updated_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn update_user(&self, user: &User) -> Result<(), ServiceError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET firstname = $2, lastname = $3, password_hash = $4, pin_hash = $5,
                user_type_code = $6, is_verified = $7, last_login_utc = $8, updated_utc = $9
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.password_hash)
        .bind(&user.pin_hash)
        .bind(&user.user_type_code)
        .bind(user.is_verified)
        .bind(user.last_login_utc)
        .bind(user.updated_utc)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    // ==================== Blog Operations ====================

    async fn insert_blog(&self, blog: &Blog) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO blogs (blog_id, author_id, author, title, content, tags, status_code,
                               created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(blog.blog_id)
        .bind(blog.author_id)
        .bind(&blog.author)
        .bind(&blog.title)
        .bind(&blog.content)
        .bind(&blog.tags)
        .bind(&blog.status_code)
        .bind(blog.created_utc)
        .bind(blog.updated_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_blog_by_id(&self, blog_id: Uuid) -> Result<Option<Blog>, ServiceError> {
        Ok(
            sqlx::query_as::<_, Blog>("SELECT * FROM blogs WHERE blog_id = $1")
                .bind(blog_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_blogs_by_status(&self, status: BlogStatus) -> Result<Vec<Blog>, ServiceError> {
        Ok(sqlx::query_as::<_, Blog>(
            "SELECT * FROM blogs WHERE status_code = $1 ORDER BY created_utc DESC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_blog(&self, blog: &Blog) -> Result<(), ServiceError> {
        let result = sqlx::query(
            r#"
            UPDATE blogs
            SET title = $2, content = $3, tags = $4, status_code = $5, updated_utc = $6
            WHERE blog_id = $1
            "#,
        )
        .bind(blog.blog_id)
        .bind(&blog.title)
        .bind(&blog.content)
        .bind(&blog.tags)
        .bind(&blog.status_code)
        .bind(blog.updated_utc)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("Blog not found".to_string()));
        }
        Ok(())
    }

    // ==================== Company Operations ====================

    async fn insert_company(&self, company: &Company) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO companies (company_id, owner_id, is_registered, country_of_incorporation,
                                   type_of_company, company_number, company_name, year_established,
                                   company_logo_url, company_website_url, headquarters_city,
                                   headquarters_country, industry_sector, type_of_entity,
                                   tax_identification_number, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(company.company_id)
        .bind(company.owner_id)
        .bind(company.is_registered)
        .bind(&company.country_of_incorporation)
        .bind(&company.type_of_company)
        .bind(&company.company_number)
        .bind(&company.company_name)
        .bind(company.year_established)
        .bind(&company.company_logo_url)
        .bind(&company.company_website_url)
        .bind(&company.headquarters_city)
        .bind(&company.headquarters_country)
        .bind(&company.industry_sector)
        .bind(&company.type_of_entity)
        .bind(&company.tax_identification_number)
        .bind(company.created_utc)
        .bind(company.updated_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_company_by_id(&self, company_id: Uuid) -> Result<Option<Company>, ServiceError> {
        Ok(
            sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE company_id = $1")
                .bind(company_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_companies_by_owner(&self, owner_id: Uuid) -> Result<Vec<Company>, ServiceError> {
        Ok(sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE owner_id = $1 ORDER BY created_utc",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_company(&self, company: &Company) -> Result<(), ServiceError> {
        let result = sqlx::query(
            r#"
            UPDATE companies
            SET contact_person_name = $2, contact_person_position = $3,
                contact_person_email = $4, contact_person_phone_number = $5,
                description = $6, mission_statement = $7, vision_statement = $8,
                core_values = $9, products_services = $10, value_proposition = $11,
                updated_utc = $12
            WHERE company_id = $1
            "#,
        )
        .bind(company.company_id)
        .bind(&company.contact_person_name)
        .bind(&company.contact_person_position)
        .bind(&company.contact_person_email)
        .bind(&company.contact_person_phone_number)
        .bind(&company.description)
        .bind(&company.mission_statement)
        .bind(&company.vision_statement)
        .bind(&company.core_values)
        .bind(&company.products_services)
        .bind(&company.value_proposition)
        .bind(company.updated_utc)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("Company not found".to_string()));
        }
        Ok(())
    }
}
