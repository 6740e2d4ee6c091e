pub mod ambulances;
pub mod attendance;
pub mod booking_locations;
pub mod bookings;
pub mod driver_assignments;
pub mod drivers;
pub mod employees;
pub mod expenses;
pub mod verification_records;

pub use ambulances as ambulance_entity;
pub use attendance as attendance_entity;
pub use booking_locations as booking_location_entity;
pub use bookings as booking_entity;
pub use driver_assignments as driver_assignment_entity;
pub use drivers as driver_entity;
pub use employees as employee_entity;
pub use expenses as expense_entity;
pub use verification_records as verification_record_entity;

pub use ambulances::AmbulanceStatus;
pub use booking_locations::LocationKind;
pub use bookings::BookingStatus;
pub use drivers::DriverStatus;
pub use employees::EmployeeRole;
pub use expenses::ExpenseCategory;
