//! Client-side routing between the list and the edit screen.

use thiserror::Error;

/// Path of the list screen.
pub const LIST_PATH: &str = "/personas-fisicas";

/// Screens reachable by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/personas-fisicas`
    PersonasList,
    /// `/personas-fisicas/{id}/edit`
    EditPersona(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route matches '{0}'")]
    Unmatched(String),
}

/// Edit path for a record id.
pub fn edit_path(id: &str) -> String {
    format!("{LIST_PATH}/{id}/edit")
}

impl Route {
    /// Parse a path; a trailing slash is tolerated.
    ///
    /// Ids are opaque, so everything between the list prefix and the final
    /// `/edit` is the id, slashes included.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let trimmed = path.trim_end_matches('/');
        if trimmed == LIST_PATH {
            return Ok(Route::PersonasList);
        }

        trimmed
            .strip_prefix(LIST_PATH)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|rest| rest.strip_suffix("/edit"))
            .filter(|id| !id.is_empty())
            .map(|id| Route::EditPersona(id.to_string()))
            .ok_or_else(|| RouteError::Unmatched(path.to_string()))
    }

    pub fn path(&self) -> String {
        match self {
            Route::PersonasList => LIST_PATH.to_string(),
            Route::EditPersona(id) => edit_path(id),
        }
    }
}

/// Current route plus back history.
#[derive(Debug)]
pub struct Router {
    current: Route,
    history: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            current: Route::PersonasList,
            history: Vec::new(),
        }
    }
}

impl Router {
    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Transition to `path`, pushing the previous route onto the history.
    ///
    /// Unknown paths leave the router untouched.
    pub fn navigate(&mut self, path: &str) -> Result<&Route, RouteError> {
        let route = Route::parse(path)?;
        tracing::debug!(from = %self.current.path(), to = %route.path(), "navigate");
        let previous = std::mem::replace(&mut self.current, route);
        self.history.push(previous);
        Ok(&self.current)
    }

    /// Return to the previous route, or to the list when history is empty.
    pub fn back(&mut self) -> &Route {
        self.current = self.history.pop().unwrap_or(Route::PersonasList);
        &self.current
    }
}
