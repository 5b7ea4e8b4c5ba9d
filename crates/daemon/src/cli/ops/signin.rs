use clap::Args;

use nestnote_daemon::http_server::api::client::ApiError;
use nestnote_daemon::http_server::api::v0::auth::signin::SigninRequest;

#[derive(Args, Debug, Clone)]
pub struct Signin {
    #[command(flatten)]
    request: SigninRequest,
}

#[derive(Debug, thiserror::Error)]
pub enum SigninError {
    #[error("{0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Signin {
    type Error = SigninError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.request.clone()).await?;

        // printed bare so it can be captured into --token / a variable
        Ok(response.access_token)
    }
}
