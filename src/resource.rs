/// Load state of a remote list the editors depend on.
///
/// Replaces a separate `loading: bool` plus `data: Option<T>` pair:
/// - NotAsked: no request issued yet
/// - Loading: request in flight
/// - Success: request resolved with data
/// - Failure: request failed, carrying the error message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource<T, E = String> {
    NotAsked,
    Loading,
    Success(T),
    Failure(E),
}

impl<T, E> Resource<T, E> {
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Resource::Success(data),
            Err(e) => Resource::Failure(e),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Resource::Failure(_))
    }

    /// A request has resolved one way or the other
    pub fn is_settled(&self) -> bool {
        matches!(self, Resource::Success(_) | Resource::Failure(_))
    }

    /// Borrow the data if the request succeeded
    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Resource::Failure(e) => Some(e),
            _ => None,
        }
    }
}

impl<T> Resource<T, String> {
    /// Record an `anyhow` result, keeping the full error chain as text
    pub fn from_anyhow(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(data) => Resource::Success(data),
            Err(e) => Resource::Failure(format!("{:#}", e)),
        }
    }
}

impl<T, E> Default for Resource<T, E> {
    fn default() -> Self {
        Resource::NotAsked
    }
}

impl<T, E> From<Result<T, E>> for Resource<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Resource::from_result(result)
    }
}
