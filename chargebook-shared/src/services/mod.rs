/// Core business services
///
/// Services hold the transactional flows that span several tables. They
/// take explicit caller identity (user ID plus admin flag) as arguments,
/// never ambient state, and return a [`ServiceError`] that the HTTP layer
/// maps onto status codes.
///
/// # Services
///
/// - [`booking`]: Slot reservation and cancellation
/// - [`station_admin`]: Station and slot management, cascading deletes
/// - [`user_admin`]: Account listing, promotion, and removal

pub mod booking;
pub mod station_admin;
pub mod user_admin;

use uuid::Uuid;

/// Error type shared by all core services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input failed a business rule (maps to 400)
    #[error("{0}")]
    Validation(String),

    /// Referenced entity does not exist (maps to 404)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request conflicts with current state (maps to 409)
    #[error("{0}")]
    Conflict(String),

    /// Caller is not allowed to perform the operation (maps to 403)
    #[error("{0}")]
    Forbidden(String),

    /// Underlying store failure (maps to 500)
    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),
}

impl ServiceError {
    /// Maps constraint-violation database errors onto domain errors
    ///
    /// Unique and foreign-key violations carry domain meaning here: a hit
    /// on the partial unique booking index means a concurrent racer won the
    /// slot, and a users foreign-key failure means the account vanished
    /// between check and insert.
    pub fn from_db(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.constraint() {
                Some("uniq_upcoming_booking_per_slot_date") => {
                    return ServiceError::Conflict(
                        "Slot is already booked for this date".to_string(),
                    );
                }
                Some("users_email_key") => {
                    return ServiceError::Conflict("Email is already registered".to_string());
                }
                Some("bookings_user_id_fkey") => {
                    return ServiceError::NotFound("User");
                }
                Some("bookings_slot_id_fkey") => {
                    return ServiceError::NotFound("Slot");
                }
                Some("slots_station_id_fkey") => {
                    return ServiceError::NotFound("Station");
                }
                _ => {}
            }
        }

        ServiceError::Store(err)
    }
}

/// Identity of the caller, carried into every service call
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Whether the caller holds the admin capability
    pub is_admin: bool,
}

impl From<crate::auth::middleware::AuthContext> for Caller {
    fn from(auth: crate::auth::middleware::AuthContext) -> Self {
        Self {
            user_id: auth.user_id,
            is_admin: auth.is_admin,
        }
    }
}

impl Caller {
    /// Returns an error unless the caller is an admin
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("Admin access required".to_string()))
        }
    }
}
