pub mod admin;
pub mod blog;
pub mod company;
pub mod user;

pub use admin::{Admin, AdminResponse, AdminRole, Permission, Permissions};
pub use blog::{Blog, BlogList, BlogResponse, BlogStatus};
pub use company::{Company, CompanyList, CompanyRegistration, CompanyResponse};
pub use user::{User, UserResponse, UserType};
