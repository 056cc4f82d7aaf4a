use std::collections::HashMap;

use crate::services::auth::clients::Client;
use crate::services::auth::error::{AuthError, AuthResult};

/// Every client configured at startup, by name.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Client>,
    // registration order, for listings
    order: Vec<String>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, client: Client) -> AuthResult<()> {
        let name = client.name().to_string();
        if self.clients.contains_key(&name) {
            return Err(AuthError::DuplicateName {
                kind: "client",
                name,
            });
        }
        self.order.push(name.clone());
        self.clients.insert(name, client);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> AuthResult<&Client> {
        self.clients
            .get(name)
            .ok_or_else(|| AuthError::ClientNotFound(name.to_string()))
    }

    /// Resolves `names` in the given order; fails on the first unknown name.
    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> AuthResult<Vec<&Client>> {
        names.iter().map(|n| self.resolve(n.as_ref())).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::clients::{AnonymousClient, ClientKind};

    fn registry() -> ClientRegistry {
        let mut registry = ClientRegistry::new();
        registry
            .register(Client::direct(AnonymousClient::with_name("Anon")))
            .unwrap();
        registry
            .register(Client::direct(AnonymousClient::with_name("Other")))
            .unwrap();
        registry
    }

    #[test]
    fn resolve_all_keeps_the_requested_order() {
        let registry = registry();
        let clients = registry.resolve_all(&["Other", "Anon"]).unwrap();

        let names: Vec<&str> = clients.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["Other", "Anon"]);
        assert!(clients.iter().all(|c| c.kind() == ClientKind::Direct));
        assert_eq!(registry.names().collect::<Vec<_>>(), ["Anon", "Other"]);
    }

    #[test]
    fn unknown_name_fails_resolution() {
        let registry = registry();
        assert!(matches!(
            registry.resolve_all(&["Anon", "Missing"]),
            Err(AuthError::ClientNotFound(name)) if name == "Missing"
        ));
    }

    #[test]
    fn names_are_unique() {
        let mut registry = registry();
        let dup = registry.register(Client::direct(AnonymousClient::with_name("Anon")));

        assert!(matches!(dup, Err(AuthError::DuplicateName { kind: "client", .. })));
        assert_eq!(registry.len(), 2);
    }
}
