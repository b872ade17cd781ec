//! Customer DTOs

use chrono::{DateTime, Utc};
use domain_debt::{Customer, CustomerDetails};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub remarks: Option<String>,
}

impl From<CreateCustomerRequest> for CustomerDetails {
    fn from(req: CreateCustomerRequest) -> Self {
        CustomerDetails {
            name: req.name,
            real_name: req.real_name,
            phone: req.phone,
            location: req.location,
            remarks: req.remarks,
        }
    }
}

impl From<UpdateCustomerRequest> for CustomerDetails {
    fn from(req: UpdateCustomerRequest) -> Self {
        CustomerDetails {
            name: req.name,
            real_name: req.real_name,
            phone: req.phone,
            location: req.location,
            remarks: req.remarks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: String,
    pub name: String,
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub remarks: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.to_string(),
            name: customer.name,
            real_name: customer.real_name,
            phone: customer.phone,
            location: customer.location,
            remarks: customer.remarks,
            deleted: customer.state.is_deleted(),
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}
