//! Demo API handlers used by the end-to-end tests.

/// User management endpoints.
///
/// @group Users
pub struct UserController;

impl UserController {
    /// Retrieve a user.
    ///
    /// Returns a single user record by id.
    ///
    /// @pathParam id integer required The user id. Example: 7
    /// @queryParam include string Related records to embed. Example: profile
    /// @responseResource 200 UserResource
    pub fn show(&self) {}

    /// Create a user.
    ///
    /// @authenticated
    /// @bodyParam email string required The email address. Example: user@example.com
    /// @bodyParam nickname string A public display name. Example: al
    pub fn store(&self) {}

    /// Internal consistency check.
    ///
    /// @hideFromAPIDocumentation
    pub fn verify(&self) {}
}

/// @resourceName User
/// @resourceDescription A user record.
pub struct UserResource;

impl UserResource {
    pub fn to_representation(&self) -> Vec<&'static str> {
        // @responseParam id integer required The user id. Example: 7
        // @responseParam email string required The email address. Example: user@example.com
        // @responseParam roles array The granted roles.
        let shape: (Vec<&str>, bool) = (
            vec![
                // @responseParam name string The role name. Example: admin
            ],
            // @responseParam active boolean Whether the account is enabled. Example: false
            true,
        );
        let _ = shape;
        Vec::new()
    }
}
