use std::time::Duration;

/// Failure of a single call to an external store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store refused the request (constraint violation, bad input).
    /// The message is shown to operators as-is.
    #[error("{0}")]
    Rejected(String),

    /// The store could not be reached or failed internally.
    #[error("Servicio no disponible: {0}")]
    Unavailable(String),

    /// The call did not complete within its deadline.
    #[error("Tiempo de espera agotado en {operation} tras {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

/// Run `fut` under `after`, mapping an elapsed deadline to
/// [`StoreError::Timeout`].
pub async fn with_deadline<T, F>(
    operation: &'static str,
    after: Duration,
    fut: F,
) -> Result<T, StoreError>
where
    F: std::future::Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout { operation, after }),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn elapsed_deadline_becomes_timeout() {
        let result: Result<(), StoreError> = with_deadline(
            "create_account",
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
        )
        .await;

        assert_matches!(
            result,
            Err(StoreError::Timeout {
                operation: "create_account",
                ..
            })
        );
    }

    #[tokio::test]
    async fn inner_error_passes_through() {
        let result: Result<(), StoreError> = with_deadline("x", Duration::from_secs(1), async {
            Err(StoreError::Rejected("nope".into()))
        })
        .await;
        assert_eq!(result, Err(StoreError::Rejected("nope".into())));
    }

    #[test]
    fn timeout_message_names_the_call() {
        let err = StoreError::Timeout {
            operation: "create_profile",
            after: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "Tiempo de espera agotado en create_profile tras 10s"
        );
    }
}
