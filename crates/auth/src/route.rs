/// Per-route auth annotations, attached when a route group is registered.
///
/// `Default` is a protected route: credential required, verified email
/// required, no role requirement.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RouteAuth {
    /// Skip every gate.
    pub is_public: bool,
    /// Authenticated but unverified principals are allowed.
    pub is_unverified: bool,
    /// The admin guard runs after authentication.
    pub requires_admin: bool,
}

impl RouteAuth {
    pub const PUBLIC: Self = Self {
        is_public: true,
        is_unverified: false,
        requires_admin: false,
    };

    pub const PROTECTED: Self = Self {
        is_public: false,
        is_unverified: false,
        requires_admin: false,
    };

    pub const UNVERIFIED: Self = Self {
        is_public: false,
        is_unverified: true,
        requires_admin: false,
    };

    pub const ADMIN: Self = Self {
        is_public: false,
        is_unverified: false,
        requires_admin: true,
    };
}
