/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `stations`: Station catalogue and admin management
/// - `slots`: Slot lookup and admin management
/// - `bookings`: Slot reservation and cancellation
/// - `users`: User administration

pub mod auth;
pub mod bookings;
pub mod health;
pub mod slots;
pub mod stations;
pub mod users;
