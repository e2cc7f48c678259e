/// Authentication primitives
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: HS256 access token issue and validation
/// - [`middleware`]: Bearer-token resolution to the current user
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use pmboard_shared::auth::jwt::{create_token, validate_token, Claims};
/// use pmboard_shared::auth::password::{hash_password, verify_password};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("password123")?;
/// assert!(verify_password("password123", &hash)?);
///
/// let secret = "a-secret-of-at-least-thirty-two-characters";
/// let token = create_token(&Claims::new(Uuid::new_v4(), Duration::minutes(30)), secret)?;
/// assert!(validate_token(&token, secret).is_ok());
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
