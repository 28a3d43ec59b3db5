use crate::domain::model::{Assessment, AssessmentUpdate};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence collaborator owning assessments for a tenant.
#[async_trait]
pub trait AssessmentService: Send + Sync {
    async fn get(&self, tenant_id: &str, assessment_id: &str) -> Result<Assessment>;

    async fn update(
        &self,
        tenant_id: &str,
        assessment_id: &str,
        update: AssessmentUpdate,
    ) -> Result<Assessment>;

    async fn publish(&self, tenant_id: &str, assessment_id: &str) -> Result<()>;

    async fn unpublish(&self, tenant_id: &str, assessment_id: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn auth_token(&self) -> Option<&str>;
    fn request_timeout_seconds(&self) -> u64;
}
