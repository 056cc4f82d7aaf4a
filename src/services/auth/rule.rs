/// Security applied to one route: which clients may authenticate the caller
/// (tried left to right) and which authorizers must then pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSecurityRule {
    pattern: String,
    clients: Vec<String>,
    authorizers: Vec<String>,
}

fn split_names(names: &str) -> Vec<String> {
    names
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl RouteSecurityRule {
    /// A rule with no client: any profile already in the session grants access.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            clients: Vec::new(),
            authorizers: Vec::new(),
        }
    }

    /// `clients` is a comma-separated list, e.g. `"DirectBasicAuthClient,ParameterClient"`.
    pub fn with_clients(mut self, clients: &str) -> Self {
        self.clients = split_names(clients);
        self
    }

    /// `authorizers` is a comma-separated list; every one of them must pass.
    pub fn with_authorizer(mut self, authorizers: &str) -> Self {
        self.authorizers = split_names(authorizers);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn clients(&self) -> &[String] {
        &self.clients
    }

    pub fn authorizers(&self) -> &[String] {
        &self.authorizers
    }
}
