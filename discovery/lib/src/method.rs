//! HTTP verbs declared by discovery methods.

use strum::{Display, EnumIter, EnumString};

/// HTTP methods a discovery method may declare in `httpMethod`.
///
/// Parsing is case-insensitive since documents are not consistent about it.
///
/// ## Examples
///
/// ```rust
/// use discovery::RestMethod;
///
/// let parsed: RestMethod = "post".parse().unwrap();
/// assert_eq!(parsed, RestMethod::Post);
/// assert!(RestMethod::Get.reads_without_body());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RestMethod {
    /// `get`, `list` and `export` style methods.
    Get,
    /// `insert`, `create` and custom actions.
    Post,
    /// Full replacement (`update`).
    Put,
    /// Partial update (`patch`).
    Patch,
    /// `delete`.
    Delete,
    /// Headers only; sends no body.
    Head,
    /// Capability queries.
    Options,
}

impl RestMethod {
    /// Returns `true` for the read/delete verbs (GET, DELETE, HEAD) that send
    /// no JSON body when the caller supplies no resource.
    ///
    /// Every other verb sends an empty JSON object instead.
    pub fn reads_without_body(&self) -> bool {
        matches!(self, Self::Get | Self::Delete | Self::Head)
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl From<RestMethod> for reqwest::Method {
    fn from(method: RestMethod) -> Self {
        method.to_reqwest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display() {
        assert_eq!(RestMethod::Get.to_string(), "GET");
        assert_eq!(RestMethod::Patch.to_string(), "PATCH");
    }

    #[test]
    fn test_parse_ignores_case() {
        assert_eq!("GET".parse::<RestMethod>().unwrap(), RestMethod::Get);
        assert_eq!("delete".parse::<RestMethod>().unwrap(), RestMethod::Delete);
        assert!("FETCH".parse::<RestMethod>().is_err());
    }

    #[test]
    fn test_reads_without_body() {
        let bodyless: Vec<_> = RestMethod::iter()
            .filter(RestMethod::reads_without_body)
            .collect();
        assert_eq!(
            bodyless,
            vec![RestMethod::Get, RestMethod::Delete, RestMethod::Head]
        );
    }

    #[test]
    fn test_to_reqwest() {
        assert_eq!(RestMethod::Put.to_reqwest(), reqwest::Method::PUT);
        assert_eq!(reqwest::Method::from(RestMethod::Head), reqwest::Method::HEAD);
    }
}
