//! Persistence seam for admins, users, blogs and companies.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::error::ServiceError;
use crate::models::{Admin, Blog, BlogStatus, Company, User};

#[async_trait]
pub trait Repository: Send + Sync {
    async fn health_check(&self) -> Result<(), ServiceError>;

    async fn insert_admin(&self, admin: &Admin) -> Result<(), ServiceError>;
    async fn find_admin_by_id(&self, admin_id: Uuid) -> Result<Option<Admin>, ServiceError>;
    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, ServiceError>;
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, ServiceError>;
    async fn list_admins(&self) -> Result<Vec<Admin>, ServiceError>;
    async fn update_admin(&self, admin: &Admin) -> Result<(), ServiceError>;

    async fn insert_user(&self, user: &User) -> Result<(), ServiceError>;
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, ServiceError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;
    async fn update_user(&self, user: &User) -> Result<(), ServiceError>;

    async fn insert_blog(&self, blog: &Blog) -> Result<(), ServiceError>;
    async fn find_blog_by_id(&self, blog_id: Uuid) -> Result<Option<Blog>, ServiceError>;
    async fn list_blogs_by_status(&self, status: BlogStatus) -> Result<Vec<Blog>, ServiceError>;
    async fn update_blog(&self, blog: &Blog) -> Result<(), ServiceError>;

    async fn insert_company(&self, company: &Company) -> Result<(), ServiceError>;
    async fn find_company_by_id(&self, company_id: Uuid) -> Result<Option<Company>, ServiceError>;
    /// Oldest first.
    async fn list_companies_by_owner(&self, owner_id: Uuid) -> Result<Vec<Company>, ServiceError>;
    async fn update_company(&self, company: &Company) -> Result<(), ServiceError>;
}

/// Process-local store with the same uniqueness rules as the SQL schema.
#[derive(Default)]
pub struct InMemoryRepository {
    admins: Mutex<HashMap<Uuid, Admin>>,
    users: Mutex<HashMap<Uuid, User>>,
    blogs: Mutex<HashMap<Uuid, Blog>>,
    companies: Mutex<HashMap<Uuid, Company>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> ServiceError {
    ServiceError::Internal(anyhow::anyhow!("In-memory store mutex poisoned: {}", e))
}

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn insert_admin(&self, admin: &Admin) -> Result<(), ServiceError> {
        let mut admins = self.admins.lock().map_err(poisoned)?;
        if admins
            .values()
            .any(|a| a.username == admin.username || same_email(&a.email, &admin.email))
        {
            return Err(ServiceError::Conflict("Admin already exists".to_string()));
        }
        admins.insert(admin.admin_id, admin.clone());
        Ok(())
    }

    async fn find_admin_by_id(&self, admin_id: Uuid) -> Result<Option<Admin>, ServiceError> {
        Ok(self.admins.lock().map_err(poisoned)?.get(&admin_id).cloned())
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, ServiceError> {
        Ok(self
            .admins
            .lock()
            .map_err(poisoned)?
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, ServiceError> {
        Ok(self
            .admins
            .lock()
            .map_err(poisoned)?
            .values()
            .find(|a| same_email(&a.email, email))
            .cloned())
    }

    async fn list_admins(&self) -> Result<Vec<Admin>, ServiceError> {
        let mut admins: Vec<Admin> = self.admins.lock().map_err(poisoned)?.values().cloned().collect();
        admins.sort_by_key(|a| a.created_utc);
        Ok(admins)
    }

    async fn update_admin(&self, admin: &Admin) -> Result<(), ServiceError> {
        let mut admins = self.admins.lock().map_err(poisoned)?;
        match admins.get_mut(&admin.admin_id) {
            Some(existing) => {
                *existing = admin.clone();
                Ok(())
            }
            None => Err(ServiceError::NotFound("Admin not found".to_string())),
        }
    }

    async fn insert_user(&self, user: &User) -> Result<(), ServiceError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        if users.values().any(|u| same_email(&u.email, &user.email)) {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(self.users.lock().map_err(poisoned)?.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self
            .users
            .lock()
            .map_err(poisoned)?
            .values()
            .find(|u| same_email(&u.email, email))
            .cloned())
    }

    async fn update_user(&self, user: &User) -> Result<(), ServiceError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        match users.get_mut(&user.user_id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(ServiceError::NotFound("User not found".to_string())),
        }
    }

    async fn insert_blog(&self, blog: &Blog) -> Result<(), ServiceError> {
        self.blogs
            .lock()
            .map_err(poisoned)?
            .insert(blog.blog_id, blog.clone());
        Ok(())
    }

    async fn find_blog_by_id(&self, blog_id: Uuid) -> Result<Option<Blog>, ServiceError> {
        Ok(self.blogs.lock().map_err(poisoned)?.get(&blog_id).cloned())
    }

    async fn list_blogs_by_status(&self, status: BlogStatus) -> Result<Vec<Blog>, ServiceError> {
        let mut blogs: Vec<Blog> = self
            .blogs
            .lock()
            .map_err(poisoned)?
            .values()
            .filter(|b| b.status() == status)
            .cloned()
            .collect();
        blogs.sort_by(|a, b| b.created_utc.cmp(&a.created_utc));
        Ok(blogs)
    }

    async fn update_blog(&self, blog: &Blog) -> Result<(), ServiceError> {
        let mut blogs = self.blogs.lock().map_err(poisoned)?;
        match blogs.get_mut(&blog.blog_id) {
            Some(existing) => {
                *existing = blog.clone();
                Ok(())
            }
            None => Err(ServiceError::NotFound("Blog not found".to_string())),
        }
    }

    async fn insert_company(&self, company: &Company) -> Result<(), ServiceError> {
        self.companies
            .lock()
            .map_err(poisoned)?
            .insert(company.company_id, company.clone());
        Ok(())
    }

    async fn find_company_by_id(&self, company_id: Uuid) -> Result<Option<Company>, ServiceError> {
        Ok(self
            .companies
            .lock()
            .map_err(poisoned)?
            .get(&company_id)
            .cloned())
    }

    async fn list_companies_by_owner(&self, owner_id: Uuid) -> Result<Vec<Company>, ServiceError> {
        let mut companies: Vec<Company> = self
            .companies
            .lock()
            .map_err(poisoned)?
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        companies.sort_by_key(|c| c.created_utc);
        Ok(companies)
    }

    async fn update_company(&self, company: &Company) -> Result<(), ServiceError> {
        let mut companies = self.companies.lock().map_err(poisoned)?;
        match companies.get_mut(&company.company_id) {
            Some(existing) => {
                *existing = company.clone();
                Ok(())
            }
            None => Err(ServiceError::NotFound("Company not found".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdminRole, Permissions, UserType};

    #[tokio::test]
    async fn duplicate_admin_email_conflicts_case_insensitively() {
        let repo = InMemoryRepository::new();
        let first = Admin::new(
            "root".into(),
            "Root@Example.com".into(),
            "h".into(),
            AdminRole::Superuser,
            Permissions::all(),
        );
        let second = Admin::new(
            "other".into(),
            "root@example.com".into(),
            "h".into(),
            AdminRole::User,
            Permissions::default(),
        );

        repo.insert_admin(&first).await.unwrap();
        assert!(matches!(
            repo.insert_admin(&second).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn user_update_round_trips() {
        let repo = InMemoryRepository::new();
        let mut user = User::new("a@b.com".into(), UserType::Investor);
        repo.insert_user(&user).await.unwrap();

        user.is_verified = true;
        repo.update_user(&user).await.unwrap();

        let stored = repo.find_user_by_email("A@B.com").await.unwrap().unwrap();
        assert!(stored.is_verified);
    }
}
