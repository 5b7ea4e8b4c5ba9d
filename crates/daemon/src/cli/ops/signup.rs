use clap::Args;

use nestnote_daemon::http_server::api::client::ApiError;
use nestnote_daemon::http_server::api::v0::auth::signup::SignupRequest;

#[derive(Args, Debug, Clone)]
pub struct Signup {
    #[command(flatten)]
    request: SignupRequest,
}

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("{0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Signup {
    type Error = SignupError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let profile = ctx.client.call(self.request.clone()).await?;

        Ok(format!(
            "registered {} <{}> as {} ({})",
            profile.name, profile.email, profile.role, profile.id
        ))
    }
}
