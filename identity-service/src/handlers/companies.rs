//! Company profiles owned by verified users. Every route takes a pin-stage
//! token; profile sections are edited on the caller's first company.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{
        company::{
            CompanyContactRequest, CompanyOfferingRequest, CompanyOverviewRequest,
            CreateCompanyRequest,
        },
        ApiResponse, ErrorResponse,
    },
    middleware::UserClaims,
    models::{Company, CompanyList, CompanyRegistration, CompanyResponse, User},
    utils::ValidatedJson,
    AppState,
};

const MAX_DESCRIPTION_WORDS: usize = 300;

fn bad_request(message: &'static str) -> AppError {
    AppError::BadRequest(anyhow::anyhow!(message))
}

fn company_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Company not found"))
}

/// Required fields, checked in a fixed order so the first gap is reported.
fn check_registration(registration: &CompanyRegistration) -> Result<(), AppError> {
    if !registration.is_registered {
        return Err(bad_request("Company is not registered"));
    }
    if registration.company_number.trim().is_empty() {
        return Err(bad_request("Company number is required"));
    }
    if !registration.company_number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad_request("Company number must be numeric"));
    }

    let required = [
        (&registration.company_name, "Company name is required"),
        (&registration.headquarters_country, "Headquarters country is required"),
        (&registration.headquarters_city, "Headquarters city is required"),
        (&registration.company_website_url, "Company website url is required"),
        (&registration.industry_sector, "Industry sector is required"),
        (&registration.type_of_entity, "Type of entity is required"),
        (
            &registration.tax_identification_number,
            "Tax identification number is required",
        ),
    ];
    match required.iter().find(|(value, _)| value.trim().is_empty()) {
        Some((_, message)) => Err(bad_request(*message)),
        None => Ok(()),
    }
}

/// The company whose profile sections the caller edits.
async fn owned_company(state: &AppState, owner: &User) -> Result<Company, AppError> {
    state
        .repo
        .list_companies_by_owner(owner.user_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(company_not_found)
}

async fn save(state: &AppState, mut company: Company) -> Result<Company, AppError> {
    company.updated_utc = Utc::now();
    state.repo.update_company(&company).await?;
    Ok(company)
}

/// Register a company
#[utoipa::path(
    post,
    path = "/companies/new",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = CompanyResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 403, description = "User not verified", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn create_company(
    State(state): State<AppState>,
    UserClaims(claims): UserClaims,
    ValidatedJson(req): ValidatedJson<CreateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let owner = state.gate.resolve_user(&claims).await?;

    let registration = CompanyRegistration::from(req);
    check_registration(&registration)?;

    let company = Company::new(owner.user_id, registration);
    state.repo.insert_company(&company).await?;

    tracing::info!(company_id = %company.company_id, owner_id = %owner.user_id, "Company created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Company created successfully",
            CompanyResponse::from(&company),
        )),
    ))
}

/// Update the contact person of the caller's company
#[utoipa::path(
    put,
    path = "/companies/update-company-contact-info",
    request_body = CompanyContactRequest,
    responses(
        (status = 200, description = "Contact information updated", body = CompanyResponse),
        (status = 404, description = "No company for this user", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn update_contact_info(
    State(state): State<AppState>,
    UserClaims(claims): UserClaims,
    ValidatedJson(req): ValidatedJson<CompanyContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    let owner = state.gate.resolve_user(&claims).await?;
    let mut company = owned_company(&state, &owner).await?;

    company.contact_person_name = req.company_contact_person_name;
    company.contact_person_position = req.company_contact_person_position;
    company.contact_person_email = req.company_contact_person_email;
    company.contact_person_phone_number = req.company_contact_person_phone_number;
    let company = save(&state, company).await?;

    Ok(Json(ApiResponse::ok(
        "Company contact information updated successfully",
        CompanyResponse::from(&company),
    )))
}

/// Update the description, mission, vision and values of the caller's company
#[utoipa::path(
    put,
    path = "/companies/update-company-overview",
    request_body = CompanyOverviewRequest,
    responses(
        (status = 200, description = "Overview updated", body = CompanyResponse),
        (status = 400, description = "Description too long", body = ErrorResponse),
        (status = 404, description = "No company for this user", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn update_overview(
    State(state): State<AppState>,
    UserClaims(claims): UserClaims,
    ValidatedJson(req): ValidatedJson<CompanyOverviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let owner = state.gate.resolve_user(&claims).await?;
    let mut company = owned_company(&state, &owner).await?;

    if req.company_description.split_whitespace().count() > MAX_DESCRIPTION_WORDS {
        return Err(bad_request(
            "Company description must be a maximum of 300 words",
        ));
    }

    company.description = req.company_description;
    company.mission_statement = req.company_mission_statement;
    company.vision_statement = req.company_vision_statement;
    company.core_values = req.company_core_values;
    let company = save(&state, company).await?;

    Ok(Json(ApiResponse::ok(
        "Company overview updated successfully",
        CompanyResponse::from(&company),
    )))
}

/// Update the products, services and value proposition of the caller's company
#[utoipa::path(
    put,
    path = "/companies/update-company-products-services",
    request_body = CompanyOfferingRequest,
    responses(
        (status = 200, description = "Offering updated", body = CompanyResponse),
        (status = 404, description = "No company for this user", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn update_products_services(
    State(state): State<AppState>,
    UserClaims(claims): UserClaims,
    ValidatedJson(req): ValidatedJson<CompanyOfferingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let owner = state.gate.resolve_user(&claims).await?;
    let mut company = owned_company(&state, &owner).await?;

    company.products_services = req.company_products_services;
    company.value_proposition = req.company_value_proposition;
    let company = save(&state, company).await?;

    Ok(Json(ApiResponse::ok(
        "Company products and services updated successfully",
        CompanyResponse::from(&company),
    )))
}

/// A single company
#[utoipa::path(
    get,
    path = "/companies/{id}",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 200, description = "Company", body = CompanyResponse),
        (status = 404, description = "Unknown company", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn get_company(
    State(state): State<AppState>,
    UserClaims(claims): UserClaims,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.gate.resolve_user(&claims).await?;

    let company = state
        .repo
        .find_company_by_id(company_id)
        .await?
        .ok_or_else(company_not_found)?;

    Ok(Json(ApiResponse::ok(
        "Company retrieved successfully",
        CompanyResponse::from(&company),
    )))
}

/// Companies owned by the caller
#[utoipa::path(
    get,
    path = "/companies",
    responses(
        (status = 200, description = "Caller's companies", body = CompanyList),
        (status = 403, description = "User not verified", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn list_companies(
    State(state): State<AppState>,
    UserClaims(claims): UserClaims,
) -> Result<impl IntoResponse, AppError> {
    let owner = state.gate.resolve_user(&claims).await?;
    let companies = state.repo.list_companies_by_owner(owner.user_id).await?;

    Ok(Json(ApiResponse::ok(
        "Companies retrieved successfully",
        CompanyList::from_companies(&companies),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> CompanyRegistration {
        CompanyRegistration {
            is_registered: true,
            country_of_incorporation: "Kenya".into(),
            type_of_company: "private".into(),
            company_number: "778899".into(),
            company_name: "Acme".into(),
            year_established: 2020,
            company_logo_url: String::new(),
            company_website_url: "https://acme.example".into(),
            headquarters_city: "Nairobi".into(),
            headquarters_country: "Kenya".into(),
            industry_sector: "fintech".into(),
            type_of_entity: "startup".into(),
            tax_identification_number: "TX-1".into(),
        }
    }

    #[test]
    fn complete_registration_passes() {
        assert!(check_registration(&registration()).is_ok());
    }

    #[test]
    fn company_number_must_be_numeric() {
        let mut reg = registration();
        reg.company_number = "77-88".into();
        assert_eq!(
            check_registration(&reg).unwrap_err().message(),
            "Company number must be numeric"
        );
    }

    #[test]
    fn first_missing_field_is_reported() {
        let mut reg = registration();
        reg.headquarters_city = " ".into();
        reg.industry_sector = String::new();
        assert_eq!(
            check_registration(&reg).unwrap_err().message(),
            "Headquarters city is required"
        );
    }
}
