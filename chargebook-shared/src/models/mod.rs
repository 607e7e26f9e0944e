/// Database models and row-level operations
///
/// Each model owns its table's single-statement SQL against a `&PgPool`.
/// Multi-statement transactional flows (booking reservation, cascade
/// deletes) live in the service layer, which issues SQL on the transaction
/// connection directly.
///
/// # Models
///
/// - [`user::User`]: Registered accounts, including admins
/// - [`station::Station`]: Charging stations with location and pricing
/// - [`slot::Slot`]: Daily time windows belonging to a station
/// - [`booking::Booking`]: A user's reservation of a slot for a date

pub mod booking;
pub mod slot;
pub mod station;
pub mod user;
