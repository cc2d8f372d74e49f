//! Route table and access guards.

use std::fmt;

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only signed-out users (login, register, forgot password).
    PublicOnly,
    /// Only signed-in users.
    Protected,
}

/// A screen of the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    ForgotPassword,
    Dashboard,
    Papers,
    NewPaper,
    PaperDetails(String),
    EditPaper(String),
    Authors,
    NewAuthor,
    EditAuthor(String),
    Journals,
    Profile,
}

impl Route {
    /// URL path of the route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::ForgotPassword => "/forgot-password".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Papers => "/papers".to_string(),
            Self::NewPaper => "/papers/new".to_string(),
            Self::PaperDetails(id) => format!("/papers/{id}"),
            Self::EditPaper(id) => format!("/papers/{id}/edit"),
            Self::Authors => "/authors".to_string(),
            Self::NewAuthor => "/authors/new".to_string(),
            Self::EditAuthor(id) => format!("/authors/{id}/edit"),
            Self::Journals => "/journals".to_string(),
            Self::Profile => "/profile".to_string(),
        }
    }

    /// Resolve a path. `/` and unknown paths resolve to the dashboard.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["forgot-password"] => Self::ForgotPassword,
            ["papers"] => Self::Papers,
            ["papers", "new"] => Self::NewPaper,
            ["papers", id] => Self::PaperDetails((*id).to_string()),
            ["papers", id, "edit"] => Self::EditPaper((*id).to_string()),
            ["authors"] => Self::Authors,
            ["authors", "new"] => Self::NewAuthor,
            ["authors", id, "edit"] => Self::EditAuthor((*id).to_string()),
            ["journals"] => Self::Journals,
            ["profile"] => Self::Profile,
            _ => Self::Dashboard,
        }
    }

    /// Access class of the route.
    #[must_use]
    pub const fn access(&self) -> Access {
        match self {
            Self::Login | Self::Register | Self::ForgotPassword => Access::PublicOnly,
            _ => Access::Protected,
        }
    }

    /// Where a user actually lands when asking for this route.
    #[must_use]
    pub fn guard(self, authenticated: bool) -> Self {
        match (self.access(), authenticated) {
            (Access::Protected, false) => Self::Login,
            (Access::PublicOnly, true) => Self::Dashboard,
            _ => self,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_path() {
        let routes = [
            Route::Login,
            Route::Dashboard,
            Route::Papers,
            Route::NewPaper,
            Route::PaperDetails("P42".into()),
            Route::EditPaper("P42".into()),
            Route::NewAuthor,
            Route::EditAuthor("7".into()),
            Route::Journals,
            Route::Profile,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_unknown_paths_go_to_dashboard() {
        assert_eq!(Route::parse("/"), Route::Dashboard);
        assert_eq!(Route::parse("/nope/at/all"), Route::Dashboard);
        assert_eq!(Route::parse("/papers?page=2"), Route::Papers);
    }

    #[test]
    fn test_guards() {
        assert_eq!(Route::Papers.guard(false), Route::Login);
        assert_eq!(Route::Papers.guard(true), Route::Papers);
        assert_eq!(Route::Login.guard(true), Route::Dashboard);
        assert_eq!(Route::Register.guard(false), Route::Register);
    }
}
