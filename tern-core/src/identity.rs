use serde::Deserialize;

/// Per-call context supplied by the transport layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallContext {
    pub passenger_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("passenger identity unavailable: no override configured and none carried in the call context")]
    Unavailable,
}

/// Resolves the acting passenger for a call. A configured override wins
/// unconditionally (development/ops impersonation); otherwise the identity
/// carried in the call context is used.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    passenger_override: Option<String>,
}

impl IdentityResolver {
    pub fn new(passenger_override: Option<String>) -> Self {
        Self { passenger_override }
    }

    pub fn resolve(&self, ctx: &CallContext) -> Result<String, IdentityError> {
        if let Some(id) = &self.passenger_override {
            return Ok(id.clone());
        }
        ctx.passenger_id.clone().ok_or(IdentityError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_over_context() {
        let resolver = IdentityResolver::new(Some("override-9".to_string()));
        let ctx = CallContext {
            passenger_id: Some("ctx-1".to_string()),
        };
        assert_eq!(resolver.resolve(&ctx).unwrap(), "override-9");
    }

    #[test]
    fn test_context_identity_used_without_override() {
        let resolver = IdentityResolver::new(None);
        let ctx = CallContext {
            passenger_id: Some("ctx-1".to_string()),
        };
        assert_eq!(resolver.resolve(&ctx).unwrap(), "ctx-1");
    }

    #[test]
    fn test_unavailable_when_neither_source_yields() {
        let resolver = IdentityResolver::new(None);
        let err = resolver.resolve(&CallContext::default()).unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable));
    }
}
