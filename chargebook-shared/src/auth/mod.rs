/// Authentication and authorization utilities
///
/// This module provides the authentication primitives for ChargeBook:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Axum middleware injecting a request-scoped [`middleware::AuthContext`]
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing with configurable expiration
/// - **Constant-time Comparison**: Password verification uses constant-time operations
///
/// # Example
///
/// ```no_run
/// use chargebook_shared::auth::password::{hash_password, verify_password};
/// use chargebook_shared::auth::jwt::{create_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), false, TokenType::Access);
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
