use super::error::BackendError;
use async_trait::async_trait;

/// A text completion backend. One call is one round trip; implementations
/// do not retry.
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;

    fn name(&self) -> &str;

    fn model_info(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestClient;

    #[async_trait]
    impl LLMClient for TestClient {
        async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
            Ok(format!("echo: {}", prompt))
        }

        fn name(&self) -> &str {
            "TestClient"
        }
    }

    #[tokio::test]
    async fn test_client_trait() {
        let client = TestClient;
        assert_eq!(client.name(), "TestClient");
        assert!(client.model_info().is_none());
        assert_eq!(client.complete("hi").await.unwrap(), "echo: hi");
    }
}
