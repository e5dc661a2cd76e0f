use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::CompanyRegistration;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCompanyRequest {
    pub is_registered: bool,

    #[validate(length(max = 100, message = "Country of incorporation must be at most 100 characters"))]
    #[schema(example = "Nigeria")]
    pub country_of_incorporation: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Type of company must be at most 100 characters"))]
    pub type_of_company: String,

    #[serde(default)]
    #[validate(length(max = 64, message = "Company number must be at most 64 characters"))]
    #[schema(example = "1234567")]
    pub company_number: String,

    #[serde(default)]
    #[validate(length(max = 255, message = "Company name must be at most 255 characters"))]
    #[schema(example = "Acme Labs")]
    pub company_name: String,

    #[validate(range(min = 1800, max = 9999, message = "Year of company establishment is invalid"))]
    #[schema(example = 2021)]
    pub year_established: i32,

    /// Already-hosted logo; uploads are handled elsewhere.
    #[serde(default)]
    #[validate(length(max = 2048, message = "Company logo url must be at most 2048 characters"))]
    pub company_logo_url: String,

    #[serde(default)]
    #[validate(length(max = 2048, message = "Company website url must be at most 2048 characters"))]
    pub company_website_url: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Headquarters city must be at most 100 characters"))]
    pub headquarters_city: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Headquarters country must be at most 100 characters"))]
    pub headquarters_country: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Industry sector must be at most 100 characters"))]
    pub industry_sector: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Type of entity must be at most 100 characters"))]
    #[schema(example = "startup")]
    pub type_of_entity: String,

    #[serde(default)]
    #[validate(length(max = 64, message = "Tax identification number must be at most 64 characters"))]
    pub tax_identification_number: String,
}

impl From<CreateCompanyRequest> for CompanyRegistration {
    fn from(req: CreateCompanyRequest) -> Self {
        Self {
            is_registered: req.is_registered,
            country_of_incorporation: req.country_of_incorporation,
            type_of_company: req.type_of_company,
            company_number: req.company_number,
            company_name: req.company_name,
            year_established: req.year_established,
            company_logo_url: req.company_logo_url,
            company_website_url: req.company_website_url,
            headquarters_city: req.headquarters_city,
            headquarters_country: req.headquarters_country,
            industry_sector: req.industry_sector,
            type_of_entity: req.type_of_entity,
            tax_identification_number: req.tax_identification_number,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompanyContactRequest {
    #[validate(length(max = 150, message = "Contact person name must be at most 150 characters"))]
    pub company_contact_person_name: String,

    #[validate(length(max = 150, message = "Contact person position must be at most 150 characters"))]
    pub company_contact_person_position: String,

    #[validate(email(message = "Contact person email is invalid"))]
    pub company_contact_person_email: String,

    #[validate(length(max = 32, message = "Contact person phone number must be at most 32 characters"))]
    pub company_contact_person_phone_number: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompanyOverviewRequest {
    pub company_description: String,
    pub company_mission_statement: String,
    pub company_vision_statement: String,
    pub company_core_values: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompanyOfferingRequest {
    pub company_products_services: String,
    pub company_value_proposition: String,
}
