use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Registration details supplied when a company is created.
#[derive(Debug, Clone)]
pub struct CompanyRegistration {
    pub is_registered: bool,
    pub country_of_incorporation: String,
    pub type_of_company: String,
    pub company_number: String,
    pub company_name: String,
    pub year_established: i32,
    pub company_logo_url: String,
    pub company_website_url: String,
    pub headquarters_city: String,
    pub headquarters_country: String,
    pub industry_sector: String,
    pub type_of_entity: String,
    pub tax_identification_number: String,
}

/// Company profile owned by a user. Contact, overview and offering sections
/// start empty and are filled in by later updates.
#[derive(Debug, Clone, FromRow)]
pub struct Company {
    pub company_id: Uuid,
    pub owner_id: Uuid,
    pub is_registered: bool,
    pub country_of_incorporation: String,
    pub type_of_company: String,
    pub company_number: String,
    pub company_name: String,
    pub year_established: i32,
    pub company_logo_url: String,
    pub company_website_url: String,
    pub headquarters_city: String,
    pub headquarters_country: String,
    pub industry_sector: String,
    pub type_of_entity: String,
    pub tax_identification_number: String,
    pub contact_person_name: String,
    pub contact_person_position: String,
    pub contact_person_email: String,
    pub contact_person_phone_number: String,
    pub description: String,
    pub mission_statement: String,
    pub vision_statement: String,
    pub core_values: String,
    pub products_services: String,
    pub value_proposition: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Company {
    pub fn new(owner_id: Uuid, registration: CompanyRegistration) -> Self {
        let now = Utc::now();
        Self {
            company_id: Uuid::new_v4(),
            owner_id,
            is_registered: registration.is_registered,
            country_of_incorporation: registration.country_of_incorporation,
            type_of_company: registration.type_of_company,
            company_number: registration.company_number,
            company_name: registration.company_name,
            year_established: registration.year_established,
            company_logo_url: registration.company_logo_url,
            company_website_url: registration.company_website_url,
            headquarters_city: registration.headquarters_city,
            headquarters_country: registration.headquarters_country,
            industry_sector: registration.industry_sector,
            type_of_entity: registration.type_of_entity,
            tax_identification_number: registration.tax_identification_number,
            contact_person_name: String::new(),
            contact_person_position: String::new(),
            contact_person_email: String::new(),
            contact_person_phone_number: String::new(),
            description: String::new(),
            mission_statement: String::new(),
            vision_statement: String::new(),
            core_values: String::new(),
            products_services: String::new(),
            value_proposition: String::new(),
            created_utc: now,
            updated_utc: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub is_registered: bool,
    pub country_of_incorporation: String,
    pub type_of_company: String,
    pub company_number: String,
    pub company_name: String,
    pub year_established: i32,
    pub company_logo_url: String,
    pub company_website_url: String,
    pub headquarters_city: String,
    pub headquarters_country: String,
    pub industry_sector: String,
    pub type_of_entity: String,
    pub tax_identification_number: String,
    pub company_contact_person_name: String,
    pub company_contact_person_position: String,
    pub company_contact_person_email: String,
    pub company_contact_person_phone_number: String,
    pub company_description: String,
    pub company_mission_statement: String,
    pub company_vision_statement: String,
    pub company_core_values: String,
    pub company_products_services: String,
    pub company_value_proposition: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Company> for CompanyResponse {
    fn from(company: &Company) -> Self {
        Self {
            id: company.company_id,
            user_id: company.owner_id,
            is_registered: company.is_registered,
            country_of_incorporation: company.country_of_incorporation.clone(),
            type_of_company: company.type_of_company.clone(),
            company_number: company.company_number.clone(),
            company_name: company.company_name.clone(),
            year_established: company.year_established,
            company_logo_url: company.company_logo_url.clone(),
            company_website_url: company.company_website_url.clone(),
            headquarters_city: company.headquarters_city.clone(),
            headquarters_country: company.headquarters_country.clone(),
            industry_sector: company.industry_sector.clone(),
            type_of_entity: company.type_of_entity.clone(),
            tax_identification_number: company.tax_identification_number.clone(),
            company_contact_person_name: company.contact_person_name.clone(),
            company_contact_person_position: company.contact_person_position.clone(),
            company_contact_person_email: company.contact_person_email.clone(),
            company_contact_person_phone_number: company.contact_person_phone_number.clone(),
            company_description: company.description.clone(),
            company_mission_statement: company.mission_statement.clone(),
            company_vision_statement: company.vision_statement.clone(),
            company_core_values: company.core_values.clone(),
            company_products_services: company.products_services.clone(),
            company_value_proposition: company.value_proposition.clone(),
            created_at: company.created_utc,
            updated_at: company.updated_utc,
        }
    }
}

/// Listing payload: `{count, companies}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyList {
    pub count: usize,
    pub companies: Vec<CompanyResponse>,
}

impl CompanyList {
    pub fn from_companies(companies: &[Company]) -> Self {
        Self {
            count: companies.len(),
            companies: companies.iter().map(CompanyResponse::from).collect(),
        }
    }
}
