use secrecy::{ExposeSecret, SecretString};

/// Credentials for authenticating against a datacenter API endpoint.
///
/// The remote API's HTTP-signature scheme is handled by the deployment's
/// signing gateway; from this crate's side authentication is a header on
/// every request, nothing more.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Pre-issued API token, sent as a bearer `Authorization` header.
    Token { key: SecretString },

    /// HTTP basic auth (account login + password).
    Basic {
        login: String,
        password: SecretString,
    },
}

impl Credentials {
    /// Apply these credentials to a request builder.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Token { key } => builder.bearer_auth(key.expose_secret()),
            Self::Basic { login, password } => {
                builder.basic_auth(login, Some(password.expose_secret()))
            }
        }
    }
}
