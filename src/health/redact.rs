use crate::configuration::Environment;

/// What a failing dependency's message is replaced with outside
/// local/development. Dependency errors routinely embed connection strings
/// and hostnames, so this is applied to every detail field before it
/// crosses the process boundary.
pub const REDACTED_PLACEHOLDER: &str = "hidden";

pub fn redact(detail: &str, environment: Environment) -> String {
    if environment.is_local() {
        detail.to_string()
    } else {
        REDACTED_PLACEHOLDER.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_environments_pass_detail_through() {
        assert_eq!(
            redact("connection refused to db:5432", Environment::Local),
            "connection refused to db:5432"
        );
        assert_eq!(
            redact("auth failed for user svc", Environment::Development),
            "auth failed for user svc"
        );
    }

    #[test]
    fn other_environments_always_get_the_placeholder() {
        for env in [Environment::Staging, Environment::Production] {
            assert_eq!(redact("password=hunter2 rejected", env), REDACTED_PLACEHOLDER);
            assert_eq!(redact("totally different message", env), REDACTED_PLACEHOLDER);
        }
    }
}
