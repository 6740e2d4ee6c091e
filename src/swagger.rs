use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    AmbulanceStatus, BookingStatus, DriverStatus, EmployeeRole, ExpenseCategory, LocationKind,
};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::healthz,
        handlers::otp::send_code,
        handlers::otp::verify_code,
        handlers::booking::create_booking,
        handlers::booking::get_booking,
        handlers::booking::list_bookings,
        handlers::booking::assign_ambulance,
        handlers::booking::update_booking_status,
        handlers::admin::login,
        handlers::fleet::list_ambulances,
        handlers::fleet::create_ambulance,
        handlers::fleet::update_ambulance,
        handlers::fleet::delete_ambulance,
        handlers::fleet::list_drivers,
        handlers::fleet::create_driver,
        handlers::fleet::update_driver_status,
        handlers::fleet::delete_driver,
        handlers::fleet::list_assignments,
        handlers::fleet::assign_driver,
        handlers::fleet::delete_assignment,
        handlers::staff::list_employees,
        handlers::staff::create_employee,
        handlers::staff::update_employee,
        handlers::staff::delete_employee,
        handlers::staff::check_in,
        handlers::staff::check_out,
        handlers::staff::list_attendance,
        handlers::expense::list_expenses,
        handlers::expense::create_expense,
        handlers::expense::delete_expense,
    ),
    components(
        schemas(
            ApiError,
            SendCodeRequest,
            SendCodeResponse,
            VerifyCodeRequest,
            VerifyCodeResponse,
            AdminLoginRequest,
            AdminLoginResponse,
            Location,
            LocationKind,
            BookingStatus,
            CreateBookingRequest,
            BookingResponse,
            AssignAmbulanceRequest,
            UpdateBookingStatusRequest,
            AmbulanceStatus,
            CreateAmbulanceRequest,
            UpdateAmbulanceRequest,
            AmbulanceResponse,
            DriverStatus,
            CreateDriverRequest,
            UpdateDriverStatusRequest,
            DriverResponse,
            AssignDriverRequest,
            DriverAssignmentResponse,
            EmployeeRole,
            CreateEmployeeRequest,
            UpdateEmployeeRequest,
            EmployeeResponse,
            AttendanceRequest,
            AttendanceResponse,
            ExpenseCategory,
            CreateExpenseRequest,
            ExpenseResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "otp", description = "Phone verification API"),
        (name = "bookings", description = "Public booking API"),
        (name = "admin", description = "Admin session API"),
        (name = "admin-bookings", description = "Booking management API"),
        (name = "admin-fleet", description = "Ambulance, driver and assignment API"),
        (name = "admin-staff", description = "Employee and attendance API"),
        (name = "admin-expenses", description = "Expense API"),
    ),
    info(
        title = "Ambulette Backend API",
        version = "1.0.0",
        description = "Ambulette booking and fleet management REST API documentation"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_gate_and_admin_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/otp/send",
            "/api/v1/otp/verify",
            "/api/v1/bookings",
            "/api/v1/admin/login",
            "/api/v1/admin/expenses",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
